//! Bounded-concurrency upload scheduler.
//!
//! Drives one upload task per file, at most `concurrency` at a time,
//! all sharing one nonce sequencer. A failing file never stops the
//! others; every outcome is folded into the returned [`RunSummary`].

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::chain::ChainClient;
use crate::error::DeployError;
use crate::nonce::NonceSequencer;
use crate::summary::RunSummary;
use crate::task::FileUpload;
use crate::types::{UnitId, UploadConfig, UploadEvent, UploadTask};

/// Uploads a batch of files to one directory contract.
pub struct UploadScheduler {
    chain: Arc<dyn ChainClient>,
    nonces: NonceSequencer,
    config: UploadConfig,
    events_tx: mpsc::UnboundedSender<UploadEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<UploadEvent>>,
    cancel: CancellationToken,
}

impl UploadScheduler {
    /// Creates a scheduler submitting through `chain` with nonces from `nonces`.
    pub fn new(chain: Arc<dyn ChainClient>, nonces: NonceSequencer, config: UploadConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            chain,
            nonces,
            config,
            events_tx,
            events_rx: Some(events_rx),
            cancel: CancellationToken::new(),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Returns a token that stops files not yet started.
    ///
    /// Files already in flight run to completion so no submitted
    /// transaction is left unaccounted for.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs every task to a terminal state and returns the summary.
    pub async fn run(&self, tasks: Vec<UploadTask>) -> RunSummary {
        let summary = Mutex::new(RunSummary::default());
        let concurrency = self.config.concurrency.max(1);
        info!(files = tasks.len(), concurrency, "upload started");

        let upload = FileUpload {
            chain: self.chain.as_ref(),
            nonces: &self.nonces,
            config: &self.config,
            events: &self.events_tx,
            summary: &summary,
        };

        stream::iter(tasks)
            .for_each_concurrent(concurrency, |task| {
                let upload = &upload;
                async move {
                    if self.cancel.is_cancelled() {
                        upload
                            .fail(UnitId::file(&task.destination_name), &DeployError::Cancelled)
                            .await;
                        return;
                    }
                    upload.run(&task).await;
                }
            })
            .await;

        let summary = summary.into_inner();
        info!(
            confirmed = summary.total_file_count,
            unchanged = summary.unchanged_count,
            failed = summary.failed.len(),
            "upload finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use super::*;
    use crate::monitor::MonitorConfig;
    use crate::scanner::scan_upload_tasks;
    use crate::testing::MockChain;
    use tempfile::TempDir;
    use w3deploy_protocol::ContractCall;
    use w3deploy_transfer::HashStrategy;

    const KIB: usize = 1024;
    const ETHER: u128 = 1_000_000_000_000_000_000;

    fn config(chunk_size_limit: u64, concurrency: usize) -> UploadConfig {
        UploadConfig {
            concurrency,
            chunk_size_limit,
            monitor: MonitorConfig {
                poll_interval: Duration::from_secs(5),
                max_attempts: None,
            },
            ..UploadConfig::default()
        }
    }

    fn task(dir: &TempDir, name: &str, data: &[u8]) -> UploadTask {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, data).unwrap();
        UploadTask {
            source_path: path,
            destination_name: name.into(),
            size: data.len() as u64,
        }
    }

    fn scheduler(chain: &Arc<MockChain>, config: UploadConfig) -> UploadScheduler {
        UploadScheduler::new(chain.clone(), NonceSequencer::new(0), config)
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_directory_upload() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), vec![b'a'; 10 * KIB]).unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.bin"), vec![7u8; 600 * KIB]).unwrap();

        let chain = Arc::new(MockChain::new());
        let sched = scheduler(&chain, UploadConfig::default());
        let tasks = scan_upload_tasks(dir.path()).unwrap();
        let summary = sched.run(tasks).await;

        let sent = chain.sent_calls();
        let writes: Vec<_> = sent
            .iter()
            .filter(|c| matches!(c, ContractCall::Write { .. }))
            .collect();
        let chunks: Vec<_> = sent
            .iter()
            .filter(|c| matches!(c, ContractCall::WriteChunk { .. }))
            .collect();
        assert_eq!(writes.len(), 1);
        assert_eq!(chunks.len(), 2);
        assert!(matches!(writes[0], ContractCall::Write { name, .. } if name == b"a.txt"));
        for call in &chunks {
            assert!(matches!(call, ContractCall::WriteChunk { name, .. } if name == b"sub/b.bin"));
        }

        assert!(summary.is_success());
        assert_eq!(summary.total_file_count, 3);
        assert_eq!(summary.total_size_bytes, (610 * KIB) as u64);
        // 10 KiB is free; each 300 KiB chunk costs 12 units.
        assert_eq!(summary.total_cost, 24 * ETHER);
    }

    #[tokio::test(start_paused = true)]
    async fn second_run_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let tasks = vec![
            task(&dir, "a.txt", &vec![1u8; 10 * KIB]),
            task(&dir, "b.bin", &vec![2u8; 1000]),
        ];

        let chain = Arc::new(MockChain::new());
        let first = scheduler(&chain, config(400, 4)).run(tasks.clone()).await;
        assert_eq!(first.total_file_count, 26 + 3);
        let sent_after_first = chain.sent_calls().len();

        let second = scheduler(&chain, config(400, 4)).run(tasks).await;
        assert_eq!(chain.sent_calls().len(), sent_after_first);
        assert_eq!(second.total_file_count, 0);
        assert_eq!(second.unchanged_count, 29);
        assert!(second.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn storage_slot_hashes_count_as_unchanged() {
        let dir = TempDir::new().unwrap();
        let data = vec![9u8; 100];
        let t = task(&dir, "legacy.bin", &data);

        let chain = Arc::new(MockChain::new());
        chain.store(
            b"legacy.bin",
            vec![HashStrategy::StorageSlotCode.hash(&data)],
        );

        let summary = scheduler(&chain, config(400, 1)).run(vec![t]).await;
        assert!(chain.sent_calls().is_empty());
        assert_eq!(summary.unchanged_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn nonces_are_unique_and_increasing() {
        let dir = TempDir::new().unwrap();
        let tasks: Vec<_> = (0..12)
            .map(|i| task(&dir, &format!("f{i:02}.bin"), &vec![i as u8; 50 + i]))
            .collect();

        let chain = Arc::new(MockChain::new());
        chain.set_pending_polls(2);
        let sched = UploadScheduler::new(chain.clone(), NonceSequencer::new(40), config(16, 3));
        let summary = sched.run(tasks).await;
        assert!(summary.is_success());

        let nonces = chain.sent_nonces();
        assert!(nonces.len() > 12);
        assert_eq!(nonces[0], 40);
        assert!(
            nonces.windows(2).all(|w| w[1] == w[0] + 1),
            "nonces not sequential in submission order: {nonces:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_is_bounded() {
        let dir = TempDir::new().unwrap();
        let tasks: Vec<_> = (0..10)
            .map(|i| task(&dir, &format!("f{i}.txt"), b"data"))
            .collect();

        let chain = Arc::new(MockChain::new());
        chain.set_read_delay(Duration::from_millis(100));
        let summary = scheduler(&chain, config(400, 3)).run(tasks).await;

        assert!(summary.is_success());
        assert_eq!(chain.max_concurrent_reads(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shrunk_file_is_removed_before_rewrite() {
        let dir = TempDir::new().unwrap();
        let t = task(&dir, "big.bin", &vec![5u8; 30]);

        let chain = Arc::new(MockChain::new());
        chain.store(b"big.bin", vec![[1u8; 32]; 5]);

        let summary = scheduler(&chain, config(10, 1)).run(vec![t]).await;
        assert!(summary.is_success());

        let sent = chain.sent_calls();
        let removes = sent
            .iter()
            .filter(|c| matches!(c, ContractCall::Remove { .. }))
            .count();
        assert_eq!(removes, 1);
        assert!(matches!(sent[0], ContractCall::Remove { .. }));
        assert_eq!(sent.len(), 4);
        assert_eq!(chain.stored_chunks(b"big.bin"), 3);
        assert_eq!(summary.total_file_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn file_changed_since_scan_keeps_remote_chunks() {
        let dir = TempDir::new().unwrap();
        let t = task(&dir, "big.bin", &vec![5u8; 30]);
        fs::write(&t.source_path, vec![5u8; 29]).unwrap();

        let chain = Arc::new(MockChain::new());
        chain.store(b"big.bin", vec![[1u8; 32]; 5]);

        let summary = scheduler(&chain, config(10, 1)).run(vec![t]).await;

        assert!(chain.sent_calls().is_empty());
        assert_eq!(chain.stored_chunks(b"big.bin"), 5);
        assert_eq!(summary.failed, vec![UnitId::file("big.bin")]);
    }

    #[tokio::test(start_paused = true)]
    async fn reverted_remove_stops_the_rewrite() {
        let dir = TempDir::new().unwrap();
        let t = task(&dir, "big.bin", &vec![5u8; 30]);

        let chain = Arc::new(MockChain::new());
        chain.store(b"big.bin", vec![[1u8; 32]; 5]);
        chain.revert_chunk(b"big.bin", 0);

        let summary = scheduler(&chain, config(10, 1)).run(vec![t]).await;

        let sent = chain.sent_calls();
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0], ContractCall::Remove { .. }));
        assert_eq!(chain.stored_chunks(b"big.bin"), 5);
        assert_eq!(summary.failed, vec![UnitId::file("big.bin")]);
        assert_eq!(summary.total_file_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn submitted_events_describe_each_chunk() {
        let dir = TempDir::new().unwrap();
        let t = task(&dir, "b.bin", &vec![2u8; 1000]);

        let chain = Arc::new(MockChain::new());
        let mut sched = scheduler(&chain, config(400, 1));
        let mut events = sched.take_events().unwrap();
        let summary = sched.run(vec![t]).await;
        drop(sched);
        assert!(summary.is_success());

        let mut intents = Vec::new();
        while let Some(event) = events.recv().await {
            if let UploadEvent::Submitted { intent, .. } = event {
                intents.push(intent);
            }
        }
        intents.sort_by_key(|i| i.nonce);
        let lens: Vec<u64> = intents.iter().map(|i| i.payload_len).collect();
        assert_eq!(lens, vec![334, 334, 332]);
        assert_eq!(intents[2].unit, UnitId::chunk("b.bin", 2));
        assert!(intents.iter().all(|i| i.value == 0));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_chunk_does_not_stop_the_others() {
        let dir = TempDir::new().unwrap();
        let t = task(&dir, "five.bin", &[3u8; 50]);

        let chain = Arc::new(MockChain::new());
        chain.revert_chunk(b"five.bin", 2);

        let summary = scheduler(&chain, config(10, 1)).run(vec![t]).await;

        let indices: Vec<u64> = chain
            .sent_calls()
            .iter()
            .filter_map(|c| match c {
                ContractCall::WriteChunk { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(summary.failed, vec![UnitId::chunk("five.bin", 2)]);
        assert_eq!(summary.total_file_count, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_chunk_state_fails_only_that_file() {
        let dir = TempDir::new().unwrap();
        let tasks = vec![
            task(&dir, "old.txt", b"old contract"),
            task(&dir, "new.txt", b"fine"),
        ];

        let chain = Arc::new(MockChain::new());
        chain.unsupported_count(b"old.txt");

        let summary = scheduler(&chain, config(400, 2)).run(tasks).await;
        assert_eq!(summary.failed, vec![UnitId::file("old.txt")]);
        assert_eq!(summary.total_file_count, 1);
        assert_eq!(chain.sent_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_submission_is_recorded() {
        let dir = TempDir::new().unwrap();
        let tasks = vec![task(&dir, "a.txt", b"a"), task(&dir, "b.txt", b"b")];

        let chain = Arc::new(MockChain::new());
        chain.reject_gas_estimate(b"a.txt");

        let mut sched = scheduler(&chain, config(400, 2));
        let mut events = sched.take_events().unwrap();
        let summary = sched.run(tasks).await;
        drop(sched);

        assert_eq!(summary.failed, vec![UnitId::file("a.txt")]);
        assert_eq!(summary.total_file_count, 1);

        let mut failed_events = 0;
        let mut confirmed_events = 0;
        while let Some(event) = events.recv().await {
            match event {
                UploadEvent::Failed { unit, error } => {
                    assert_eq!(unit, UnitId::file("a.txt"));
                    assert!(error.contains("failed to submit a.txt"));
                    failed_events += 1;
                }
                UploadEvent::Confirmed { unit, .. } => {
                    assert_eq!(unit, UnitId::file("b.txt"));
                    confirmed_events += 1;
                }
                _ => {}
            }
        }
        assert_eq!((failed_events, confirmed_events), (1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_run_skips_pending_files() {
        let dir = TempDir::new().unwrap();
        let tasks = vec![task(&dir, "a.txt", b"a"), task(&dir, "b.txt", b"b")];

        let chain = Arc::new(MockChain::new());
        let sched = scheduler(&chain, config(400, 1));
        sched.cancel_token().cancel();
        let summary = sched.run(tasks).await;

        assert!(chain.sent_calls().is_empty());
        assert_eq!(summary.failed.len(), 2);
    }

    #[tokio::test]
    async fn take_events_once() {
        let chain = Arc::new(MockChain::new());
        let mut sched = scheduler(&chain, UploadConfig::default());
        assert!(sched.take_events().is_some());
        assert!(sched.take_events().is_none());
    }
}
