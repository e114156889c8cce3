//! Shared types for the w3deploy pipeline.
//!
//! Everything here is chain-client agnostic: the upload crate speaks in
//! these types and the chain crate translates them to RPC calls.

pub mod constants;
pub mod network;
pub mod types;

// Re-export primary types for convenience.
pub use network::{NameService, NetworkConfig, builtin_networks, find_network};
pub use types::{ContractCall, ParseTxHashError, Receipt, TxHash, TxOptions};
