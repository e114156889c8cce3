//! Flat directory upload pipeline.
//!
//! This crate implements the **business logic** of deploying a local
//! tree into an on-chain flat directory. It has no RPC dependencies: the
//! caller provides a [`ChainClient`] implementation bound to one sending
//! account and one directory contract.
//!
//! # Pipeline
//!
//! 1. **Scan**: walk the local path into a flat list of [`UploadTask`]s
//! 2. **Plan**: split each file into chunks under the per-call limit
//! 3. **Diff**: compare chunk fingerprints with what is stored on-chain,
//!    removing stale trailing chunks of shrunk files first
//! 4. **Submit**: send writes with nonces from a shared [`NonceSequencer`]
//! 5. **Confirm**: poll receipts and fold outcomes into a [`RunSummary`]

pub mod chain;
pub mod error;
pub mod monitor;
pub mod nonce;
pub mod scanner;
pub mod scheduler;
pub mod summary;
mod task;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export primary types for convenience.
pub use chain::{ChainClient, ChainError, ChainFuture};
pub use error::DeployError;
pub use monitor::{ConfirmationMonitor, MonitorConfig};
pub use nonce::NonceSequencer;
pub use scanner::scan_upload_tasks;
pub use scheduler::UploadScheduler;
pub use summary::RunSummary;
pub use types::{TransactionIntent, UnitId, UploadConfig, UploadEvent, UploadTask};
