//! One-shot management calls: deploy a directory, withdraw its balance,
//! set the default file.

use alloy::primitives::{Address, B256};
use alloy::providers::Provider;
use tracing::info;
use w3deploy_protocol::{ContractCall, TxHash, TxOptions};
use w3deploy_transfer::validate_destination_name;
use w3deploy_upload::{ChainClient, ConfirmationMonitor, MonitorConfig, NonceSequencer, UnitId};

use crate::client::{ChainConnection, DirectoryClient};
use crate::contracts::FlatDirectoryFactory;
use crate::error::ChainClientError;
use crate::resolve::parse_address;

/// Deploys a new flat directory through the network's factory and returns
/// its address.
pub async fn create_directory(
    conn: &ChainConnection,
    monitor: MonitorConfig,
) -> Result<Address, ChainClientError> {
    let network = conn.network();
    let factory = network
        .factory
        .as_deref()
        .ok_or_else(|| ChainClientError::NoFactory(network.name.clone()))?;
    let factory = parse_address(factory)?;

    let pending = FlatDirectoryFactory::new(factory, conn.provider().clone())
        .create()
        .from(conn.account())
        .send()
        .await?;
    let tx = TxHash(pending.tx_hash().0);
    info!(factory = %factory, tx = %tx, "create submitted");

    // Receipts are looked up by hash, so any directory client can poll them.
    let client = conn.directory(factory);
    ConfirmationMonitor::new(&client, monitor)
        .confirm(&UnitId::file("create"), tx)
        .await?;

    let receipt = conn
        .provider()
        .get_transaction_receipt(B256::from(tx.0))
        .await?
        .ok_or(ChainClientError::CreationEventMissing(tx))?;
    receipt
        .inner
        .logs()
        .iter()
        .find_map(|log| {
            log.log_decode::<FlatDirectoryFactory::FlatDirectoryCreated>()
                .ok()
        })
        .map(|event| event.inner.data.addr)
        .ok_or(ChainClientError::CreationEventMissing(tx))
}

/// Withdraws the directory balance to its owner.
pub async fn refund(
    conn: &ChainConnection,
    directory: Address,
    monitor: MonitorConfig,
) -> Result<TxHash, ChainClientError> {
    submit(conn.directory(directory), ContractCall::Refund, monitor).await
}

/// Sets the file served when the directory root is requested.
pub async fn set_default(
    conn: &ChainConnection,
    directory: Address,
    file: &str,
    monitor: MonitorConfig,
) -> Result<TxHash, ChainClientError> {
    validate_destination_name(file).map_err(w3deploy_upload::DeployError::from)?;
    let call = ContractCall::SetDefault {
        name: file.as_bytes().to_vec(),
    };
    submit(conn.directory(directory), call, monitor).await
}

async fn submit(
    client: DirectoryClient,
    call: ContractCall,
    monitor: MonitorConfig,
) -> Result<TxHash, ChainClientError> {
    let gas_limit = client.estimate_gas(&call, 0).await?;
    let nonces = NonceSequencer::seed(&client).await?;

    let client_ref = &client;
    let call_ref = &call;
    let tx = nonces
        .submit(|nonce| async move {
            let options = TxOptions {
                nonce,
                gas_limit,
                value: 0,
            };
            client_ref.send_transaction(call_ref, options).await
        })
        .await?;
    info!(method = call.method(), directory = %client.address(), tx = %tx, "submitted");

    ConfirmationMonitor::new(&client, monitor)
        .confirm(&UnitId::file(call.method()), tx)
        .await?;
    Ok(tx)
}
