use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;
use w3deploy_protocol::TxHash;
use w3deploy_upload::{ChainError, DeployError};

#[derive(Error, Debug)]
pub enum ChainClientError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("invalid RPC URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError<TransportErrorKind>),

    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("connected to chain {actual}, expected {expected}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("{0}")]
    Resolution(String),

    #[error("network {0} has no directory factory")]
    NoFactory(String),

    #[error("transaction {0} emitted no FlatDirectoryCreated event")]
    CreationEventMissing(TxHash),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}
