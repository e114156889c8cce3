//! Console lines for upload events and the run summary.

use std::fmt::Write;

use w3deploy_protocol::constants::WEI_PER_ETHER;
use w3deploy_upload::{RunSummary, UploadEvent};

/// Formats a wei amount in ether without trailing zeros.
pub fn format_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let frac = wei % WEI_PER_ETHER;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:018}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

pub fn format_event(event: &UploadEvent) -> String {
    match event {
        UploadEvent::Removing { name, tx } => format!("{name}: removing stale chunks (tx {tx})"),
        UploadEvent::Submitted { intent, tx } => format!(
            "{}: submitted tx {tx} (nonce {}, cost {} ether)",
            intent.unit,
            intent.nonce,
            format_ether(intent.value)
        ),
        UploadEvent::Unchanged { unit } => format!("{unit}: unchanged, skipped"),
        UploadEvent::Confirmed { unit, tx } => format!("{unit}: success (tx {tx})"),
        UploadEvent::Failed { unit, error } => format!("{unit}: FAILED: {error}"),
    }
}

pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total cost: {} ether", format_ether(summary.total_cost));
    let _ = writeln!(out, "Total files uploaded: {}", summary.total_file_count);
    let _ = writeln!(out, "Total size: {:.2} KB", summary.total_size_kb());
    if summary.unchanged_count > 0 {
        let _ = writeln!(out, "Unchanged chunks: {}", summary.unchanged_count);
    }
    if !summary.failed.is_empty() {
        let _ = writeln!(out, "Failed ({}):", summary.failed.len());
        for unit in &summary.failed {
            let _ = writeln!(out, "  {unit}");
        }
    }
    out
}
