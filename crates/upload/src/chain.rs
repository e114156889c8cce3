//! Chain client trait.
//!
//! `ChainClient` is implemented by the chain crate on top of an RPC
//! provider. Using a trait keeps the upload pipeline decoupled from the
//! transport and testable with mocks.

use std::future::Future;
use std::pin::Pin;

use w3deploy_protocol::{ContractCall, Receipt, TxHash, TxOptions};

/// Errors reported by a [`ChainClient`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The target contract does not implement the queried method.
    #[error("not supported by contract: {0}")]
    Unsupported(String),

    /// The node refused the transaction or its gas estimation.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Boxed future returned by [`ChainClient`] methods.
pub type ChainFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ChainError>> + Send + 'a>>;

/// Access to one flat directory contract through one sending account.
pub trait ChainClient: Send + Sync {
    /// Pending transaction count of the sending account.
    fn pending_nonce(&self) -> ChainFuture<'_, u64>;

    /// Number of chunks stored under `name`.
    fn count_chunks<'a>(&'a self, name: &'a [u8]) -> ChainFuture<'a, u64>;

    /// Stored hash of chunk `index` of `name` (all zeros when absent).
    fn chunk_hash<'a>(&'a self, name: &'a [u8], index: u64) -> ChainFuture<'a, [u8; 32]>;

    /// Gas needed to execute `call` with `value` attached.
    fn estimate_gas<'a>(&'a self, call: &'a ContractCall, value: u128) -> ChainFuture<'a, u64>;

    /// Signs and broadcasts `call`. Returns once the node accepted it.
    fn send_transaction<'a>(
        &'a self,
        call: &'a ContractCall,
        options: TxOptions,
    ) -> ChainFuture<'a, TxHash>;

    /// Receipt of `tx`, or `None` while it is unknown or pending.
    fn receipt(&self, tx: TxHash) -> ChainFuture<'_, Option<Receipt>>;
}
