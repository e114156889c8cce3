//! alloy-backed [`ChainClient`].

use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use alloy::transports::{RpcError, TransportErrorKind};
use tracing::{debug, info};
use url::Url;
use w3deploy_protocol::{ContractCall, NetworkConfig, Receipt, TxHash, TxOptions};
use w3deploy_upload::{ChainClient, ChainError, ChainFuture};

use crate::contracts::FlatDirectory;
use crate::error::ChainClientError;
use crate::resolve;

/// A wallet-backed provider for one network and one sending account.
#[derive(Clone)]
pub struct ChainConnection {
    provider: DynProvider,
    account: Address,
    network: NetworkConfig,
}

impl ChainConnection {
    /// Connects to `network` and checks that the node serves the expected
    /// chain id.
    pub async fn connect(
        network: &NetworkConfig,
        private_key: &str,
    ) -> Result<Self, ChainClientError> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| ChainClientError::InvalidKey(format!("{e}")))?;
        let account = signer.address();
        let url = Url::parse(&network.rpc_url)?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        let chain_id = provider.get_chain_id().await?;
        if chain_id != network.chain_id {
            return Err(ChainClientError::ChainIdMismatch {
                expected: network.chain_id,
                actual: chain_id,
            });
        }

        info!(network = %network.name, chain_id, account = %account, "connected");
        Ok(Self {
            provider,
            account,
            network: network.clone(),
        })
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub(crate) fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Resolves a domain or literal address on this network.
    pub async fn resolve(&self, target: &str) -> Result<Address, ChainClientError> {
        resolve::resolve(&self.provider, target, &self.network.name_service).await
    }

    /// Binds a client to the flat directory at `address`.
    pub fn directory(&self, address: Address) -> DirectoryClient {
        DirectoryClient {
            contract: FlatDirectory::new(address, self.provider.clone()),
            account: self.account,
        }
    }
}

/// One flat directory contract seen through one sending account.
#[derive(Clone)]
pub struct DirectoryClient {
    contract: FlatDirectory::FlatDirectoryInstance<DynProvider>,
    account: Address,
}

impl DirectoryClient {
    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    fn request(&self, call: &ContractCall, value: u128) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.account)
            .with_to(self.address())
            .with_input(encode_call(call))
            .with_value(U256::from(value))
    }
}

/// ABI-encodes `call` against the flat directory interface.
pub fn encode_call(call: &ContractCall) -> Vec<u8> {
    match call {
        ContractCall::Write { name, data } => FlatDirectory::writeCall {
            name: Bytes::copy_from_slice(name),
            data: Bytes::copy_from_slice(data),
        }
        .abi_encode(),
        ContractCall::WriteChunk { name, index, data } => FlatDirectory::writeChunkCall {
            name: Bytes::copy_from_slice(name),
            chunkId: U256::from(*index),
            data: Bytes::copy_from_slice(data),
        }
        .abi_encode(),
        ContractCall::Remove { name } => FlatDirectory::removeCall {
            name: Bytes::copy_from_slice(name),
        }
        .abi_encode(),
        ContractCall::SetDefault { name } => FlatDirectory::setDefaultCall {
            defaultFile: Bytes::copy_from_slice(name),
        }
        .abi_encode(),
        ContractCall::Refund => FlatDirectory::refundCall {}.abi_encode(),
    }
}

/// JSON-RPC error code geth and most clients use for `eth_call` reverts.
const EXECUTION_REVERTED: i64 = 3;

fn is_revert(code: i64, message: &str) -> bool {
    code == EXECUTION_REVERTED || message.contains("execution reverted")
}

/// Reverts and undecodable returns mean the contract lacks the method.
/// Any other node error stays an RPC error.
fn read_error(e: alloy::contract::Error) -> ChainError {
    match e {
        alloy::contract::Error::TransportError(RpcError::ErrorResp(payload))
            if is_revert(payload.code, &payload.message) =>
        {
            ChainError::Unsupported(payload.message.to_string())
        }
        alloy::contract::Error::ZeroData(method, _) => ChainError::Unsupported(method),
        alloy::contract::Error::AbiError(e) => ChainError::Unsupported(e.to_string()),
        other => ChainError::Rpc(other.to_string()),
    }
}

fn send_error(e: RpcError<TransportErrorKind>) -> ChainError {
    match e {
        RpcError::ErrorResp(payload) => ChainError::Rejected(payload.message.to_string()),
        other => ChainError::Rpc(other.to_string()),
    }
}

fn rpc_error(e: RpcError<TransportErrorKind>) -> ChainError {
    ChainError::Rpc(e.to_string())
}

impl ChainClient for DirectoryClient {
    fn pending_nonce(&self) -> ChainFuture<'_, u64> {
        Box::pin(async move {
            self.contract
                .provider()
                .get_transaction_count(self.account)
                .pending()
                .await
                .map_err(rpc_error)
        })
    }

    fn count_chunks<'a>(&'a self, name: &'a [u8]) -> ChainFuture<'a, u64> {
        Box::pin(async move {
            let count = self
                .contract
                .countChunks(Bytes::copy_from_slice(name))
                .call()
                .await
                .map_err(read_error)?;
            u64::try_from(count).map_err(|_| ChainError::Rpc(format!("chunk count {count} out of range")))
        })
    }

    fn chunk_hash<'a>(&'a self, name: &'a [u8], index: u64) -> ChainFuture<'a, [u8; 32]> {
        Box::pin(async move {
            let hash = self
                .contract
                .getChunkHash(Bytes::copy_from_slice(name), U256::from(index))
                .call()
                .await
                .map_err(read_error)?;
            Ok(hash.0)
        })
    }

    fn estimate_gas<'a>(&'a self, call: &'a ContractCall, value: u128) -> ChainFuture<'a, u64> {
        Box::pin(async move {
            let gas = self
                .contract
                .provider()
                .estimate_gas(self.request(call, value))
                .await
                .map_err(send_error)?;
            debug!(method = call.method(), gas, "estimated gas");
            Ok(gas)
        })
    }

    fn send_transaction<'a>(
        &'a self,
        call: &'a ContractCall,
        options: TxOptions,
    ) -> ChainFuture<'a, TxHash> {
        Box::pin(async move {
            let request = self
                .request(call, options.value)
                .with_nonce(options.nonce)
                .with_gas_limit(options.gas_limit);
            let pending = self
                .contract
                .provider()
                .send_transaction(request)
                .await
                .map_err(send_error)?;
            Ok(TxHash(pending.tx_hash().0))
        })
    }

    fn receipt(&self, tx: TxHash) -> ChainFuture<'_, Option<Receipt>> {
        Box::pin(async move {
            let receipt = self
                .contract
                .provider()
                .get_transaction_receipt(B256::from(tx.0))
                .await
                .map_err(rpc_error)?;
            Ok(receipt.map(|r| Receipt {
                tx_hash: tx,
                block_number: r.block_number(),
                success: r.status(),
            }))
        })
    }
}
