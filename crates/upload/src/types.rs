//! Data types for the upload flow.

use std::fmt;
use std::path::PathBuf;

use w3deploy_protocol::TxHash;
use w3deploy_protocol::constants::{DEFAULT_CHUNK_SIZE_LIMIT, DEFAULT_CONCURRENCY};
use w3deploy_transfer::Pricing;

use crate::monitor::MonitorConfig;

/// One file to upload, produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub source_path: PathBuf,
    /// Key under which the file is stored in the directory contract.
    pub destination_name: String,
    pub size: u64,
}

impl UploadTask {
    /// Destination name as the byte string sent on-chain.
    pub fn name_bytes(&self) -> &[u8] {
        self.destination_name.as_bytes()
    }
}

/// Identifies a file, or one chunk of it, in events and failure lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitId {
    pub name: String,
    pub chunk: Option<u64>,
}

impl UnitId {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chunk: None,
        }
    }

    pub fn chunk(name: impl Into<String>, index: u64) -> Self {
        Self {
            name: name.into(),
            chunk: Some(index),
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chunk {
            Some(index) => write!(f, "{} (chunk {index})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A write about to be submitted for one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    pub unit: UnitId,
    /// Chunk bytes carried by the call.
    pub payload_len: u64,
    /// Storage payment attached to the call, in wei.
    pub value: u128,
    pub nonce: u64,
}

/// Progress event emitted during a run.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// Stale chunks of a shrunk file are being removed.
    Removing { name: String, tx: TxHash },
    /// A write was accepted by the node.
    Submitted { intent: TransactionIntent, tx: TxHash },
    /// Chunk content already matches the chain.
    Unchanged { unit: UnitId },
    /// A write was mined successfully.
    Confirmed { unit: UnitId, tx: TxHash },
    /// A file or chunk failed; the run continues.
    Failed { unit: UnitId, error: String },
}

/// Settings for an upload run.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Maximum number of files processed at once.
    pub concurrency: usize,
    /// Largest payload per contract call, in bytes.
    pub chunk_size_limit: u64,
    pub pricing: Pricing,
    pub monitor: MonitorConfig,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            chunk_size_limit: DEFAULT_CHUNK_SIZE_LIMIT,
            pricing: Pricing::default(),
            monitor: MonitorConfig::default(),
        }
    }
}
