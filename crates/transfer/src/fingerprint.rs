//! Content fingerprints used to skip chunks that are already on-chain.
//!
//! Directories have historically stored chunk data in two ways: directly
//! in contract storage, hashed as raw bytes, or as the code of a
//! per-chunk storage-slot contract, hashed together with that contract's
//! runtime prefix. A remote hash matching either scheme means the chunk
//! is unchanged.

use sha3::{Digest, Keccak256};

/// A 32-byte keccak-256 content hash.
pub type Fingerprint = [u8; 32];

/// Runtime code prefix of the storage-slot contract holding chunk data.
pub const STORAGE_SLOT_CODE: &[u8] = &[
    0x60, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x15, 0x60, 0x0f, 0x57, 0x60, 0x00, 0x80, 0xfd,
    0x5b, 0x50, 0x60, 0x04, 0x36, 0x10, 0x60, 0x28, 0x57, 0x60, 0x00, 0x35, 0x60, 0xe0, 0x1c,
    0x80, 0x63, 0x2b, 0x68, 0xb9, 0xc6, 0x14, 0x60, 0x2d, 0x57, 0x5b, 0x60, 0x00, 0x80, 0xfd,
    0x5b, 0x60, 0x33, 0x60, 0x35, 0x56, 0x5b, 0x00, 0x5b, 0x60, 0x00, 0x80, 0xfd, 0xfe, 0xa2,
    0x64, 0x69, 0x70, 0x66, 0x73, 0x58, 0x22, 0x12, 0x20, 0xfc, 0x66, 0xc9, 0xaf, 0xb7, 0xcb,
    0x2f, 0x62, 0x09, 0xae, 0x28, 0x16, 0x7c, 0xf2, 0x6c, 0x6c, 0x06, 0xf8, 0x6a, 0x82, 0xcb,
    0xe3, 0xc5, 0x6d, 0xe9, 0x90, 0x27, 0x97, 0x93, 0x89, 0xa1, 0xbe, 0x64, 0x73, 0x6f, 0x6c,
    0x63, 0x43, 0x00, 0x08, 0x07, 0x00, 0x33,
];

/// A way of hashing chunk bytes the way some contract version stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashStrategy {
    /// keccak256 of the raw bytes.
    Raw,
    /// keccak256 of [`STORAGE_SLOT_CODE`] followed by the bytes.
    StorageSlotCode,
}

/// Strategies tried, in order, when comparing against a remote hash.
pub const STRATEGIES: [HashStrategy; 2] = [HashStrategy::Raw, HashStrategy::StorageSlotCode];

impl HashStrategy {
    /// Hashes `data` under this strategy.
    pub fn hash(self, data: &[u8]) -> Fingerprint {
        let mut hasher = Keccak256::new();
        if self == Self::StorageSlotCode {
            hasher.update(STORAGE_SLOT_CODE);
        }
        hasher.update(data);
        hasher.finalize().into()
    }
}

/// Returns the strategy whose hash of `data` equals `remote`, if any.
///
/// An all-zero remote hash means nothing is stored and never matches.
pub fn unchanged(data: &[u8], remote: &Fingerprint) -> Option<HashStrategy> {
    if remote.iter().all(|b| *b == 0) {
        return None;
    }
    STRATEGIES.into_iter().find(|s| s.hash(data) == *remote)
}

/// Returns `true` when stale trailing chunks must be removed first.
pub fn needs_clear(existing_chunks: u64, planned_chunks: u64) -> bool {
    existing_chunks > planned_chunks
}
