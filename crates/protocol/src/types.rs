use std::fmt;
use std::str::FromStr;

/// Hash identifying a submitted transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({self})")
    }
}

/// Error returned when a transaction hash string is malformed.
#[derive(Debug, thiserror::Error)]
#[error("invalid transaction hash: {0}")]
pub struct ParseTxHashError(String);

impl FromStr for TxHash {
    type Err = ParseTxHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| ParseTxHashError(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ParseTxHashError(format!("expected 32 bytes: {s}")))?;
        Ok(Self(arr))
    }
}

/// Execution receipt of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    /// Block the transaction was included in. `None` while still pending.
    pub block_number: Option<u64>,
    /// `false` when execution reverted.
    pub success: bool,
}

impl Receipt {
    /// Returns `true` once the receipt references a block.
    pub fn is_final(&self) -> bool {
        self.block_number.is_some()
    }
}

/// A state-changing call on the flat directory contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    /// Whole-file write for files that fit in one call.
    Write { name: Vec<u8>, data: Vec<u8> },
    /// One chunk of a larger file.
    WriteChunk {
        name: Vec<u8>,
        index: u64,
        data: Vec<u8>,
    },
    /// Drops every stored chunk of `name`.
    Remove { name: Vec<u8> },
    /// Sets the file served for the bare directory address.
    SetDefault { name: Vec<u8> },
    /// Withdraws the contract balance to the owner.
    Refund,
}

impl ContractCall {
    /// Solidity method name of this call.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Write { .. } => "write",
            Self::WriteChunk { .. } => "writeChunk",
            Self::Remove { .. } => "remove",
            Self::SetDefault { .. } => "setDefault",
            Self::Refund => "refund",
        }
    }

    /// Payload bytes carried by the call (empty for control calls).
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Write { data, .. } | Self::WriteChunk { data, .. } => data,
            _ => &[],
        }
    }
}

/// Sending options attached to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOptions {
    pub nonce: u64,
    pub gas_limit: u64,
    /// Value attached to the call, in wei.
    pub value: u128,
}
