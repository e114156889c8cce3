use std::time::Duration;

/// Largest payload a single `write`/`writeChunk` call may carry (475 KiB).
///
/// Files above this size are split into chunks.
pub const DEFAULT_CHUNK_SIZE_LIMIT: u64 = 475 * 1024;

/// Default number of files uploaded concurrently.
pub const DEFAULT_CONCURRENCY: usize = 15;

/// Interval between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Name of the network used when none is given.
pub const DEFAULT_NETWORK: &str = "w3q-testnet";

/// Text record consulted on namehash resolvers.
pub const CONTENT_CONTRACT_KEY: &str = "contentcontract";

/// Wei per ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;
