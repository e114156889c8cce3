//! In-memory chain used by the pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use w3deploy_protocol::{ContractCall, Receipt, TxHash, TxOptions};
use w3deploy_transfer::HashStrategy;

use crate::chain::{ChainClient, ChainError, ChainFuture};

#[derive(Default)]
struct State {
    stored: HashMap<Vec<u8>, Vec<[u8; 32]>>,
    sent: Vec<(ContractCall, TxOptions)>,
    outcomes: HashMap<TxHash, bool>,
    polls: HashMap<TxHash, u32>,
    pending_polls: u32,
    failing_polls: u32,
    revert: HashSet<(Vec<u8>, u64)>,
    unsupported: HashSet<Vec<u8>>,
    reject_gas: HashSet<Vec<u8>>,
    read_delay: Option<Duration>,
    active_reads: usize,
    max_active_reads: usize,
}

/// A directory contract and account held in memory.
///
/// Writes take effect when sent unless marked to revert; receipts become
/// final after a configurable number of pending polls.
#[derive(Default)]
pub(crate) struct MockChain {
    state: Mutex<State>,
}

fn call_target(call: &ContractCall) -> (Vec<u8>, u64) {
    match call {
        ContractCall::Write { name, .. }
        | ContractCall::Remove { name }
        | ContractCall::SetDefault { name } => (name.clone(), 0),
        ContractCall::WriteChunk { name, index, .. } => (name.clone(), *index),
        ContractCall::Refund => (Vec::new(), 0),
    }
}

impl MockChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn store(&self, name: &[u8], hashes: Vec<[u8; 32]>) {
        self.state.lock().unwrap().stored.insert(name.to_vec(), hashes);
    }

    pub(crate) fn stored_chunks(&self, name: &[u8]) -> usize {
        self.state
            .lock()
            .unwrap()
            .stored
            .get(name)
            .map_or(0, Vec::len)
    }

    pub(crate) fn set_pending_polls(&self, polls: u32) {
        self.state.lock().unwrap().pending_polls = polls;
    }

    pub(crate) fn fail_receipt_polls(&self, polls: u32) {
        self.state.lock().unwrap().failing_polls = polls;
    }

    pub(crate) fn revert_chunk(&self, name: &[u8], index: u64) {
        self.state
            .lock()
            .unwrap()
            .revert
            .insert((name.to_vec(), index));
    }

    pub(crate) fn unsupported_count(&self, name: &[u8]) {
        self.state.lock().unwrap().unsupported.insert(name.to_vec());
    }

    pub(crate) fn reject_gas_estimate(&self, name: &[u8]) {
        self.state.lock().unwrap().reject_gas.insert(name.to_vec());
    }

    pub(crate) fn set_read_delay(&self, delay: Duration) {
        self.state.lock().unwrap().read_delay = Some(delay);
    }

    pub(crate) fn max_concurrent_reads(&self) -> usize {
        self.state.lock().unwrap().max_active_reads
    }

    pub(crate) fn sent_calls(&self) -> Vec<ContractCall> {
        let s = self.state.lock().unwrap();
        s.sent.iter().map(|(call, _)| call.clone()).collect()
    }

    pub(crate) fn sent_nonces(&self) -> Vec<u64> {
        let s = self.state.lock().unwrap();
        s.sent.iter().map(|(_, options)| options.nonce).collect()
    }

    pub(crate) fn receipt_polls(&self, tx: TxHash) -> u32 {
        self.state
            .lock()
            .unwrap()
            .polls
            .get(&tx)
            .copied()
            .unwrap_or(0)
    }

    fn apply(stored: &mut HashMap<Vec<u8>, Vec<[u8; 32]>>, call: &ContractCall) {
        match call {
            ContractCall::Write { name, data } => {
                let hash = HashStrategy::Raw.hash(data);
                let chunks = stored.entry(name.clone()).or_default();
                if chunks.is_empty() {
                    chunks.push(hash);
                } else {
                    chunks[0] = hash;
                }
            }
            ContractCall::WriteChunk { name, index, data } => {
                let hash = HashStrategy::Raw.hash(data);
                let chunks = stored.entry(name.clone()).or_default();
                let index = *index as usize;
                if chunks.len() <= index {
                    chunks.resize(index + 1, [0u8; 32]);
                }
                chunks[index] = hash;
            }
            ContractCall::Remove { name } => {
                stored.remove(name);
            }
            ContractCall::SetDefault { .. } | ContractCall::Refund => {}
        }
    }
}

impl ChainClient for MockChain {
    fn pending_nonce(&self) -> ChainFuture<'_, u64> {
        Box::pin(async move { Ok(0) })
    }

    fn count_chunks<'a>(&'a self, name: &'a [u8]) -> ChainFuture<'a, u64> {
        Box::pin(async move {
            let delay = {
                let mut s = self.state.lock().unwrap();
                s.active_reads += 1;
                s.max_active_reads = s.max_active_reads.max(s.active_reads);
                s.read_delay
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let mut s = self.state.lock().unwrap();
            s.active_reads -= 1;
            if s.unsupported.contains(name) {
                return Err(ChainError::Unsupported("countChunks".into()));
            }
            Ok(s.stored.get(name).map_or(0, |c| c.len() as u64))
        })
    }

    fn chunk_hash<'a>(&'a self, name: &'a [u8], index: u64) -> ChainFuture<'a, [u8; 32]> {
        Box::pin(async move {
            let s = self.state.lock().unwrap();
            Ok(s.stored
                .get(name)
                .and_then(|c| c.get(index as usize))
                .copied()
                .unwrap_or([0u8; 32]))
        })
    }

    fn estimate_gas<'a>(&'a self, call: &'a ContractCall, _value: u128) -> ChainFuture<'a, u64> {
        Box::pin(async move {
            let s = self.state.lock().unwrap();
            let (name, _) = call_target(call);
            if s.reject_gas.contains(&name) {
                return Err(ChainError::Rejected("execution reverted".into()));
            }
            Ok(21_000 + call.payload().len() as u64 * 16)
        })
    }

    fn send_transaction<'a>(
        &'a self,
        call: &'a ContractCall,
        options: TxOptions,
    ) -> ChainFuture<'a, TxHash> {
        Box::pin(async move {
            let mut s = self.state.lock().unwrap();
            let mut hash = [0u8; 32];
            hash[24..].copy_from_slice(&(s.sent.len() as u64 + 1).to_be_bytes());
            let tx = TxHash(hash);

            let success = !s.revert.contains(&call_target(call));
            if success {
                Self::apply(&mut s.stored, call);
            }
            s.outcomes.insert(tx, success);
            s.sent.push((call.clone(), options));
            Ok(tx)
        })
    }

    fn receipt(&self, tx: TxHash) -> ChainFuture<'_, Option<Receipt>> {
        Box::pin(async move {
            let mut s = self.state.lock().unwrap();
            let polls = {
                let count = s.polls.entry(tx).or_insert(0);
                *count += 1;
                *count
            };
            if s.failing_polls > 0 {
                s.failing_polls -= 1;
                return Err(ChainError::Rpc("connection reset".into()));
            }
            let Some(&success) = s.outcomes.get(&tx) else {
                return Ok(None);
            };
            if polls <= s.pending_polls {
                return Ok(Some(Receipt {
                    tx_hash: tx,
                    block_number: None,
                    success,
                }));
            }
            Ok(Some(Receipt {
                tx_hash: tx,
                block_number: Some(100 + polls as u64),
                success,
            }))
        })
    }
}
