//! Nonce allocation for one sending account.

use std::future::Future;

use tokio::sync::Mutex;
use tracing::debug;

use crate::chain::{ChainClient, ChainError};

/// Hands out strictly increasing nonces to concurrent submitters.
///
/// Seeded once per run from the account's pending transaction count.
/// Allocated nonces are never handed out again, even if the transaction
/// using them is rejected: gaps are possible, duplicates are not.
#[derive(Debug)]
pub struct NonceSequencer {
    next: Mutex<u64>,
}

impl NonceSequencer {
    /// Creates a sequencer starting at `start`.
    pub fn new(start: u64) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }

    /// Creates a sequencer seeded from the chain's pending nonce.
    pub async fn seed(chain: &dyn ChainClient) -> Result<Self, ChainError> {
        let start = chain.pending_nonce().await?;
        debug!(start, "nonce sequencer seeded");
        Ok(Self::new(start))
    }

    /// Allocates a nonce and runs `submit` with it while holding the
    /// sequencer, so transactions reach the node in nonce order.
    pub async fn submit<F, Fut, T>(&self, submit: F) -> T
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = T>,
    {
        let mut next = self.next.lock().await;
        let nonce = *next;
        *next += 1;
        submit(nonce).await
    }
}
