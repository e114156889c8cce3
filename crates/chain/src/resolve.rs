//! Destination name resolution.
//!
//! A target is either a literal `0x` address or a domain looked up through
//! the network's [`NameService`].

use alloy::primitives::{Address, B256, Bytes, keccak256};
use alloy::providers::DynProvider;
use tracing::debug;
use w3deploy_protocol::NameService;
use w3deploy_protocol::constants::CONTENT_CONTRACT_KEY;

use crate::contracts::{NameRegistry, PointerRegistry, TextResolver};
use crate::error::ChainClientError;

/// Parses a `0x`-prefixed 20-byte hex address.
pub fn parse_address(s: &str) -> Result<Address, ChainClientError> {
    let s = s.trim();
    if !s.starts_with("0x") || s.len() != 42 {
        return Err(ChainClientError::InvalidAddress(s.to_string()));
    }
    s.parse()
        .map_err(|_| ChainClientError::InvalidAddress(s.to_string()))
}

/// ENS namehash of `domain`.
pub fn namehash(domain: &str) -> B256 {
    let mut node = B256::ZERO;
    if domain.is_empty() {
        return node;
    }
    for label in domain.rsplit('.') {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        node = keccak256(buf);
    }
    node
}

/// Removes a trailing `.suffix` from `domain`.
fn strip_suffix<'a>(domain: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return domain;
    }
    domain
        .strip_suffix(suffix)
        .and_then(|rest| rest.strip_suffix('.'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(domain)
}

fn resolved(domain: &str, address: Address) -> Result<Address, ChainClientError> {
    if address.is_zero() {
        return Err(ChainClientError::Resolution(format!(
            "{domain} does not resolve to a directory"
        )));
    }
    debug!(domain, address = %address, "resolved");
    Ok(address)
}

pub(crate) async fn resolve(
    provider: &DynProvider,
    target: &str,
    service: &NameService,
) -> Result<Address, ChainClientError> {
    let target = target.trim();
    if target.starts_with("0x") {
        return parse_address(target);
    }

    match service {
        NameService::None => Err(ChainClientError::Resolution(format!(
            "{target} is not an address and the network has no name service"
        ))),
        NameService::Pointer { registry, suffix } => {
            let registry = PointerRegistry::new(parse_address(registry)?, provider.clone());
            let name = strip_suffix(target, suffix);
            let address = registry
                .pointerOf(Bytes::copy_from_slice(name.as_bytes()))
                .call()
                .await?;
            resolved(target, address)
        }
        NameService::NameHash { registry } => {
            let node = namehash(target);
            let registry = NameRegistry::new(parse_address(registry)?, provider.clone());
            let resolver = resolved(target, registry.resolver(node).call().await?)?;

            let text = TextResolver::new(resolver, provider.clone())
                .text(node, CONTENT_CONTRACT_KEY.to_string())
                .call()
                .await?;
            let address = parse_address(&text).map_err(|_| {
                ChainClientError::Resolution(format!(
                    "{target} has no {CONTENT_CONTRACT_KEY} record"
                ))
            })?;
            resolved(target, address)
        }
    }
}
