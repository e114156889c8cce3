//! Network table: RPC endpoint, chain id, and the contracts used to
//! resolve names and create directories on each supported chain.

use serde::{Deserialize, Serialize};

/// How destination domains are turned into contract addresses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NameService {
    /// Only literal addresses are accepted.
    #[default]
    None,
    /// Direct `pointerOf(bytes name)` lookup on a directory contract.
    Pointer {
        registry: String,
        /// Suffix stripped from domains before lookup (e.g. `w3q`).
        #[serde(default, skip_serializing_if = "String::is_empty")]
        suffix: String,
    },
    /// ENS-style namehash lookup: `registry.resolver(node)` then
    /// `resolver.text(node, "contentcontract")`.
    NameHash { registry: String },
}

/// Per-network settings, resolved once per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    #[serde(default)]
    pub name_service: NameService,
    /// Factory deploying new flat directories (`create`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,
}

/// Networks known without any configuration file.
pub fn builtin_networks() -> Vec<NetworkConfig> {
    vec![
        NetworkConfig {
            name: "w3q-testnet".into(),
            chain_id: 3333,
            rpc_url: "https://testnet.web3q.io:8545".into(),
            name_service: NameService::Pointer {
                registry: "0x5095135E861845dee965141fEA9061F38C85c699".into(),
                suffix: "w3q".into(),
            },
            factory: None,
        },
        NetworkConfig {
            name: "local".into(),
            chain_id: 31337,
            rpc_url: "http://127.0.0.1:8545".into(),
            name_service: NameService::None,
            factory: None,
        },
    ]
}

/// Looks up a network by name or by decimal chain id.
///
/// Entries in `extra` take precedence over built-in ones.
pub fn find_network(selector: &str, extra: &[NetworkConfig]) -> Option<NetworkConfig> {
    let chain_id = selector.parse::<u64>().ok();
    let matches = |n: &NetworkConfig| n.name == selector || Some(n.chain_id) == chain_id;

    extra
        .iter()
        .find(|n| matches(n))
        .cloned()
        .or_else(|| builtin_networks().into_iter().find(|n| matches(n)))
}
