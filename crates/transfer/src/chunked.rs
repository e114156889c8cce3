use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::TransferError;
use crate::types::{Chunk, ChunkPlan};

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Splits a file of `size` bytes into chunks no larger than `limit`.
///
/// Files up to `limit` become a single chunk. Larger files are split into
/// `ceil(size / limit)` near-equal chunks of `ceil(size / count)` bytes,
/// the last one shorter. A zero `limit` is treated as one byte.
pub fn plan(size: u64, limit: u64) -> ChunkPlan {
    let limit = limit.max(1);
    if size <= limit {
        return ChunkPlan {
            file_size: size,
            chunk_count: 1,
            chunk_size: size,
        };
    }

    let chunk_count = size.div_ceil(limit);
    ChunkPlan {
        file_size: size,
        chunk_count,
        chunk_size: size.div_ceil(chunk_count),
    }
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads a file chunk by chunk following a [`ChunkPlan`].
pub struct ChunkReader {
    file: std::fs::File,
    plan: ChunkPlan,
}

impl ChunkReader {
    /// Opens `path` and checks its size still matches the plan.
    pub fn new(path: &Path, plan: ChunkPlan) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let actual = file.metadata()?.len();
        if actual != plan.file_size {
            return Err(TransferError::SizeChanged {
                expected: plan.file_size,
                actual,
            });
        }
        Ok(Self { file, plan })
    }

    /// Reads chunk `index` regardless of the current position.
    pub fn read_chunk(&mut self, index: u64) -> Result<Chunk, TransferError> {
        let range = self.plan.range(index);
        self.file.seek(SeekFrom::Start(range.start))?;
        let mut data = vec![0u8; (range.end - range.start) as usize];
        self.file.read_exact(&mut data)?;
        Ok(Chunk {
            index,
            offset: range.start,
            data,
        })
    }
}
