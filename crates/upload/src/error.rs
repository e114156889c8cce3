//! Upload error types.

use w3deploy_protocol::TxHash;

use crate::chain::ChainError;
use crate::types::UnitId;

/// Errors produced during an upload run.
///
/// Per-file and per-chunk variants are caught at the task boundary and
/// recorded in the run summary. Only pre-flight errors reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer error: {0}")]
    Transfer(#[from] w3deploy_transfer::TransferError),

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("cannot read on-chain state of {unit}: {source}")]
    ReadFailed { unit: UnitId, source: ChainError },

    #[error("failed to submit {unit}: {source}")]
    SubmissionFailed { unit: UnitId, source: ChainError },

    #[error("transaction {tx} for {unit} reverted (is the sender the directory owner?)")]
    ConfirmedRevert { unit: UnitId, tx: TxHash },

    #[error("transaction {tx} for {unit} not final after {attempts} polls")]
    ConfirmationTimedOut {
        unit: UnitId,
        tx: TxHash,
        attempts: u32,
    },

    #[error("cannot resolve {0}")]
    ResolutionFailed(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("cancelled")]
    Cancelled,
}
