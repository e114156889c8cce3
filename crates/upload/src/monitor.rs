//! Transaction finality polling.

use std::time::Duration;

use tracing::{debug, trace, warn};
use w3deploy_protocol::constants::DEFAULT_POLL_INTERVAL;
use w3deploy_protocol::{Receipt, TxHash};

use crate::chain::ChainClient;
use crate::error::DeployError;
use crate::types::UnitId;

/// Polling settings for [`ConfirmationMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Delay between receipt polls.
    pub poll_interval: Duration,
    /// Give up after this many polls. `None` waits indefinitely: finality
    /// time is unbounded and an abandoned transaction may still be mined.
    pub max_attempts: Option<u32>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

/// Waits for submitted transactions to be mined.
pub struct ConfirmationMonitor<'a> {
    chain: &'a dyn ChainClient,
    config: MonitorConfig,
}

impl<'a> ConfirmationMonitor<'a> {
    pub fn new(chain: &'a dyn ChainClient, config: MonitorConfig) -> Self {
        Self { chain, config }
    }

    /// Polls until `tx` has a receipt bearing a block number.
    ///
    /// RPC errors while polling are logged and count as a pending poll.
    /// Returns `None` once `max_attempts` polls passed without finality.
    pub async fn await_finality(&self, tx: TxHash) -> Option<Receipt> {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            match self.chain.receipt(tx).await {
                Ok(Some(receipt)) if receipt.is_final() => {
                    debug!(tx = %tx, attempt, block = ?receipt.block_number, "transaction final");
                    return Some(receipt);
                }
                Ok(_) => trace!(tx = %tx, attempt, "transaction pending"),
                Err(e) => warn!(tx = %tx, attempt, error = %e, "receipt poll failed"),
            }

            if self.config.max_attempts.is_some_and(|max| attempt >= max) {
                return None;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Waits for `tx` and classifies its outcome for `unit`.
    ///
    /// A reverted transaction is [`DeployError::ConfirmedRevert`]; running
    /// out of attempts is [`DeployError::ConfirmationTimedOut`].
    pub async fn confirm(&self, unit: &UnitId, tx: TxHash) -> Result<Receipt, DeployError> {
        let Some(receipt) = self.await_finality(tx).await else {
            return Err(DeployError::ConfirmationTimedOut {
                unit: unit.clone(),
                tx,
                attempts: self.config.max_attempts.unwrap_or_default(),
            });
        };

        if !receipt.success {
            return Err(DeployError::ConfirmedRevert {
                unit: unit.clone(),
                tx,
            });
        }
        Ok(receipt)
    }
}
