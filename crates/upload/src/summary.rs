//! Aggregate results of an upload run.

use crate::types::UnitId;

/// Totals and failures of one run.
///
/// Counters only include writes whose receipt reported success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Storage payments of confirmed writes, in wei.
    pub total_cost: u128,
    /// Confirmed write transactions (one per chunk).
    pub total_file_count: u64,
    /// Bytes carried by confirmed writes.
    pub total_size_bytes: u64,
    /// Chunks skipped because the chain already holds them.
    pub unchanged_count: u64,
    /// Failed files and chunks, in completion order.
    pub failed: Vec<UnitId>,
}

impl RunSummary {
    pub(crate) fn record_success(&mut self, size: u64, cost: u128) {
        self.total_file_count += 1;
        self.total_size_bytes += size;
        self.total_cost += cost;
    }

    pub(crate) fn record_unchanged(&mut self) {
        self.unchanged_count += 1;
    }

    pub(crate) fn record_failure(&mut self, unit: UnitId) {
        self.failed.push(unit);
    }

    /// Confirmed bytes in KiB.
    pub fn total_size_kb(&self) -> f64 {
        self.total_size_bytes as f64 / 1024.0
    }

    /// Returns `true` when nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
