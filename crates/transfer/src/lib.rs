//! Chunk planning, change detection and pricing for flat directory uploads.
//!
//! Pure building blocks: nothing in this crate talks to the chain.

mod chunked;
mod cost;
mod fingerprint;
mod types;
mod validation;

pub use chunked::{ChunkReader, plan};
pub use cost::{FREE_TIER_BYTES, Pricing};
pub use fingerprint::{
    Fingerprint, HashStrategy, STORAGE_SLOT_CODE, STRATEGIES, needs_clear, unchanged,
};
pub use types::{Chunk, ChunkPlan};
pub use validation::validate_destination_name;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file changed while reading: expected {expected} bytes, found {actual}")]
    SizeChanged { expected: u64, actual: u64 },

    #[error("invalid destination name: {0}")]
    InvalidName(String),
}
