mod cli;
mod config;
mod output;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use w3deploy_chain::{ChainConnection, admin};
use w3deploy_upload::{NonceSequencer, UploadScheduler, scan_upload_tasks};

use cli::{Cli, Command, GlobalArgs};
use config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,w3deploy=info")),
        )
        .init();

    let Some((command, global)) = Cli::parse().into_parts() else {
        let _ = Cli::command().print_help();
        return ExitCode::from(2);
    };

    match run(command, global).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command ran but some unit failed.
async fn run(command: Command, global: GlobalArgs) -> anyhow::Result<bool> {
    let mut config = match &global.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(concurrency) = global.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(chunk_size) = global.chunk_size {
        config.chunk_size_limit = chunk_size;
    }
    if let Some(secs) = global.poll_interval {
        config.poll_interval_secs = secs;
    }
    if global.max_poll_attempts.is_some() {
        config.max_poll_attempts = global.max_poll_attempts;
    }

    let network = config.network(global.network.as_deref())?;
    let key = global
        .private_key
        .context("no private key: pass --private-key or set W3DEPLOY_PRIVATE_KEY")?;
    let conn = ChainConnection::connect(&network, &key)
        .await
        .with_context(|| format!("cannot connect to {}", network.name))?;
    let monitor = config.monitor_config();

    match command {
        Command::Deploy { path, domain } => deploy(&conn, &config, &path, &domain).await,
        Command::Create => {
            let address = admin::create_directory(&conn, monitor).await?;
            println!("FlatDirectory created: {address}");
            Ok(true)
        }
        Command::Refund { address } => {
            let directory = conn.resolve(&address).await?;
            let tx = admin::refund(&conn, directory, monitor).await?;
            println!("refund succeeded (tx {tx})");
            Ok(true)
        }
        Command::Default { address, file } => {
            let directory = conn.resolve(&address).await?;
            let tx = admin::set_default(&conn, directory, &file, monitor).await?;
            println!("default file set to {file} (tx {tx})");
            Ok(true)
        }
    }
}

async fn deploy(
    conn: &ChainConnection,
    config: &AppConfig,
    path: &Path,
    domain: &str,
) -> anyhow::Result<bool> {
    // Both checks happen before any transaction is sent.
    let tasks = scan_upload_tasks(path)?;
    let directory = conn.resolve(domain).await?;
    println!(
        "deploying {} file(s) from {} to {directory} as {}",
        tasks.len(),
        path.display(),
        conn.account()
    );

    let client = Arc::new(conn.directory(directory));
    let nonces = NonceSequencer::seed(client.as_ref())
        .await
        .context("cannot read account nonce")?;
    let mut scheduler = UploadScheduler::new(client, nonces, config.upload_config());

    let printer = scheduler.take_events().map(|mut rx| {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                println!("{}", output::format_event(&event));
            }
        })
    });

    let cancel = scheduler.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, finishing files already in flight");
            cancel.cancel();
        }
    });

    let summary = scheduler.run(tasks).await;
    interrupt.abort();

    // Dropping the scheduler closes the event channel so the printer drains.
    drop(scheduler);
    if let Some(handle) = printer {
        let _ = handle.await;
    }

    print!("{}", output::format_summary(&summary));
    Ok(summary.is_success())
}
