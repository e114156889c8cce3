use std::ops::Range;

/// How a file is split across contract calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    /// Total file size in bytes.
    pub file_size: u64,
    /// Number of chunks (at least 1, even for empty files).
    pub chunk_count: u64,
    /// Size of every chunk except possibly the last.
    pub chunk_size: u64,
}

impl ChunkPlan {
    /// Returns `true` when the file fits in a single `write` call.
    pub fn is_single(&self) -> bool {
        self.chunk_count == 1
    }

    /// Byte range of chunk `index`.
    ///
    /// Ranges are contiguous, non-overlapping and cover `0..file_size`.
    pub fn range(&self, index: u64) -> Range<u64> {
        let start = (index * self.chunk_size).min(self.file_size);
        let end = (start + self.chunk_size).min(self.file_size);
        start..end
    }

    /// Iterates over all chunk ranges in order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        (0..self.chunk_count).map(|i| self.range(i))
    }
}

/// A chunk of file data read according to a [`ChunkPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of the chunk in the plan.
    pub index: u64,
    /// Byte offset within the file.
    pub offset: u64,
    /// Raw chunk data.
    pub data: Vec<u8>,
}

impl Chunk {
    /// Size of this chunk in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
