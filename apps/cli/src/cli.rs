//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "w3deploy",
    version,
    about = "Deploy a local directory to an on-chain flat directory contract",
    args_conflicts_with_subcommands = true,
    after_help = "Examples:\n  \
    w3deploy deploy ./dist home.w3q --private-key 0x...\n  \
    w3deploy create --network w3q-testnet\n  \
    w3deploy default 0x5095...c699 index.html\n  \
    w3deploy ./dist home.w3q 0x... w3q-testnet"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub legacy: LegacyArgs,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload a file or directory tree to a flat directory
    Deploy {
        /// File or directory to upload
        path: PathBuf,
        /// Directory address or domain name
        domain: String,
    },
    /// Deploy a new flat directory through the network's factory
    Create,
    /// Withdraw the balance of a flat directory to its owner
    Refund {
        /// Directory address or domain name
        address: String,
    },
    /// Set the file served at the directory root
    Default {
        /// Directory address or domain name
        address: String,
        /// Stored file name, e.g. index.html
        file: String,
    },
}

/// `w3deploy <path> <domain> [key] [network]`
#[derive(Args, Debug, Default)]
pub struct LegacyArgs {
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    #[arg(value_name = "DOMAIN", requires = "path")]
    pub domain: Option<String>,

    #[arg(value_name = "KEY", requires = "domain")]
    pub key: Option<String>,

    #[arg(id = "legacy_network", value_name = "NETWORK", requires = "key")]
    pub network: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Private key of the sending account
    #[arg(
        long,
        env = "W3DEPLOY_PRIVATE_KEY",
        hide_env_values = true,
        global = true
    )]
    pub private_key: Option<String>,

    /// Network name or chain id
    #[arg(long, env = "W3DEPLOY_NETWORK", global = true)]
    pub network: Option<String>,

    /// Configuration file (default: ~/.config/w3deploy/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Files uploaded concurrently
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Largest payload per contract call, in bytes
    #[arg(long, global = true)]
    pub chunk_size: Option<u64>,

    /// Seconds between receipt polls
    #[arg(long, global = true)]
    pub poll_interval: Option<u64>,

    /// Give up waiting for a receipt after this many polls
    #[arg(long, global = true)]
    pub max_poll_attempts: Option<u32>,
}

impl Cli {
    /// Resolves the legacy positional form into a `deploy` command.
    ///
    /// Returns the command and any key or network given positionally.
    pub fn into_parts(self) -> Option<(Command, GlobalArgs)> {
        let mut global = self.global;
        if let Some(command) = self.command {
            return Some((command, global));
        }

        let LegacyArgs {
            path,
            domain,
            key,
            network,
        } = self.legacy;
        if global.private_key.is_none() {
            global.private_key = key;
        }
        if global.network.is_none() {
            global.network = network;
        }
        Some((
            Command::Deploy {
                path: path?,
                domain: domain?,
            },
            global,
        ))
    }
}
