//! Per-file upload: diff against the chain, submit, confirm.

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use w3deploy_protocol::{ContractCall, Receipt, TxHash, TxOptions};
use w3deploy_transfer::{Chunk, ChunkPlan, ChunkReader, needs_clear, plan, unchanged};

use crate::chain::ChainClient;
use crate::error::DeployError;
use crate::monitor::ConfirmationMonitor;
use crate::nonce::NonceSequencer;
use crate::summary::RunSummary;
use crate::types::{TransactionIntent, UnitId, UploadConfig, UploadEvent, UploadTask};

/// A write accepted by the node, waiting for its receipt.
struct Submitted {
    unit: UnitId,
    tx: TxHash,
    size: u64,
    value: u128,
}

/// Shared handles one file upload works with.
pub(crate) struct FileUpload<'a> {
    pub(crate) chain: &'a dyn ChainClient,
    pub(crate) nonces: &'a NonceSequencer,
    pub(crate) config: &'a UploadConfig,
    pub(crate) events: &'a mpsc::UnboundedSender<UploadEvent>,
    pub(crate) summary: &'a Mutex<RunSummary>,
}

impl FileUpload<'_> {
    /// Uploads one file. Never fails: every error ends up in the summary.
    pub(crate) async fn run(&self, task: &UploadTask) {
        if let Err(e) = self.upload(task).await {
            self.fail(UnitId::file(&task.destination_name), &e).await;
        }
    }

    /// Records a failed file or chunk.
    pub(crate) async fn fail(&self, unit: UnitId, error: &DeployError) {
        warn!(unit = %unit, error = %error, "upload failed");
        self.summary.lock().await.record_failure(unit.clone());
        let _ = self.events.send(UploadEvent::Failed {
            unit,
            error: error.to_string(),
        });
    }

    /// Errors returned here fail the whole file; chunk-level errors are
    /// recorded inline and the remaining chunks still go out.
    async fn upload(&self, task: &UploadTask) -> Result<(), DeployError> {
        let name = task.destination_name.as_str();
        let file_unit = UnitId::file(name);
        let plan = plan(task.size, self.config.chunk_size_limit);

        // Nothing on-chain is touched until the file matches the plan.
        let mut reader = tokio::task::spawn_blocking({
            let path = task.source_path.clone();
            move || ChunkReader::new(&path, plan)
        })
        .await
        .map_err(|e| DeployError::Io(std::io::Error::other(e)))??;

        let existing = self
            .chain
            .count_chunks(task.name_bytes())
            .await
            .map_err(|source| DeployError::ReadFailed {
                unit: file_unit.clone(),
                source,
            })?;
        debug!(
            name,
            size = task.size,
            chunks = plan.chunk_count,
            existing,
            "planned upload"
        );

        // Stale trailing chunks must be gone before any rewrite.
        let stored = if needs_clear(existing, plan.chunk_count) {
            self.clear(task, &file_unit).await?;
            0
        } else {
            existing
        };

        let monitor = ConfirmationMonitor::new(self.chain, self.config.monitor);
        let mut pending = FuturesUnordered::new();

        for index in 0..plan.chunk_count {
            let unit = if plan.is_single() {
                file_unit.clone()
            } else {
                UnitId::chunk(name, index)
            };

            let joined = tokio::task::spawn_blocking(move || {
                let chunk = reader.read_chunk(index);
                (reader, chunk)
            })
            .await;
            let chunk = match joined {
                Ok((r, chunk)) => {
                    reader = r;
                    chunk
                }
                Err(e) => {
                    // The reader is gone with the blocking task.
                    self.fail(unit, &DeployError::Io(std::io::Error::other(e)))
                        .await;
                    break;
                }
            };

            let submitted = match chunk {
                Ok(chunk) => self.submit_chunk(task, &plan, chunk, stored, &unit).await,
                Err(e) => Err(e.into()),
            };
            match submitted {
                Ok(Some(submitted)) => pending.push(confirm(&monitor, submitted)),
                Ok(None) => {}
                Err(e) => self.fail(unit, &e).await,
            }
        }

        while let Some((submitted, result)) = pending.next().await {
            match result {
                Ok(receipt) => {
                    info!(
                        unit = %submitted.unit,
                        tx = %submitted.tx,
                        block = ?receipt.block_number,
                        "write confirmed"
                    );
                    self.summary
                        .lock()
                        .await
                        .record_success(submitted.size, submitted.value);
                    let _ = self.events.send(UploadEvent::Confirmed {
                        unit: submitted.unit,
                        tx: submitted.tx,
                    });
                }
                Err(e) => self.fail(submitted.unit, &e).await,
            }
        }

        Ok(())
    }

    /// Removes every stored chunk of the file and waits for the receipt.
    async fn clear(&self, task: &UploadTask, unit: &UnitId) -> Result<(), DeployError> {
        let call = ContractCall::Remove {
            name: task.name_bytes().to_vec(),
        };
        let (_, tx) = self.send(&call, 0, unit).await?;
        info!(name = %task.destination_name, tx = %tx, "removing stale chunks");
        let _ = self.events.send(UploadEvent::Removing {
            name: task.destination_name.clone(),
            tx,
        });

        ConfirmationMonitor::new(self.chain, self.config.monitor)
            .confirm(unit, tx)
            .await?;
        Ok(())
    }

    /// Submits one chunk unless the chain already holds it.
    async fn submit_chunk(
        &self,
        task: &UploadTask,
        plan: &ChunkPlan,
        chunk: Chunk,
        stored: u64,
        unit: &UnitId,
    ) -> Result<Option<Submitted>, DeployError> {
        let name = task.name_bytes();

        if chunk.index < stored {
            let remote = self
                .chain
                .chunk_hash(name, chunk.index)
                .await
                .map_err(|source| DeployError::ReadFailed {
                    unit: unit.clone(),
                    source,
                })?;
            if let Some(strategy) = unchanged(&chunk.data, &remote) {
                debug!(unit = %unit, ?strategy, "chunk unchanged");
                self.summary.lock().await.record_unchanged();
                let _ = self.events.send(UploadEvent::Unchanged { unit: unit.clone() });
                return Ok(None);
            }
        }

        let size = chunk.size();
        let value = self.config.pricing.estimate(size);
        let call = if plan.is_single() {
            ContractCall::Write {
                name: name.to_vec(),
                data: chunk.data,
            }
        } else {
            ContractCall::WriteChunk {
                name: name.to_vec(),
                index: chunk.index,
                data: chunk.data,
            }
        };

        let (nonce, tx) = self.send(&call, value, unit).await?;
        let intent = TransactionIntent {
            unit: unit.clone(),
            payload_len: size,
            value,
            nonce,
        };
        info!(unit = %unit, tx = %tx, nonce, value = %value, "write submitted");
        let _ = self.events.send(UploadEvent::Submitted { intent, tx });

        Ok(Some(Submitted {
            unit: unit.clone(),
            tx,
            size,
            value,
        }))
    }

    /// Estimates gas, then takes a nonce and broadcasts `call`.
    ///
    /// Gas is estimated first so a failing estimate does not burn a nonce.
    async fn send(
        &self,
        call: &ContractCall,
        value: u128,
        unit: &UnitId,
    ) -> Result<(u64, TxHash), DeployError> {
        let gas_limit = self
            .chain
            .estimate_gas(call, value)
            .await
            .map_err(|source| DeployError::SubmissionFailed {
                unit: unit.clone(),
                source,
            })?;

        let chain = self.chain;
        let (nonce, sent) = self
            .nonces
            .submit(|nonce| async move {
                let options = TxOptions {
                    nonce,
                    gas_limit,
                    value,
                };
                (nonce, chain.send_transaction(call, options).await)
            })
            .await;

        let tx = sent.map_err(|source| DeployError::SubmissionFailed {
            unit: unit.clone(),
            source,
        })?;
        Ok((nonce, tx))
    }
}

async fn confirm(
    monitor: &ConfirmationMonitor<'_>,
    submitted: Submitted,
) -> (Submitted, Result<Receipt, DeployError>) {
    let result = monitor.confirm(&submitted.unit, submitted.tx).await;
    (submitted, result)
}
