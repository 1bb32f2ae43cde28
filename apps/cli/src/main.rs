//! filedrop command-line client entry point.

mod cli;
mod config;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use filedrop_client::StorageClient;
use filedrop_transfer::FileSource;
use filedrop_upload::{FailurePolicy, UploadSequencer};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting filedrop");

    let args = Cli::parse_args();

    let mut config = match &args.config {
        Some(path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };
    if let Some(server) = args.server {
        config.server_url = server;
    }
    tracing::debug!(server = %config.server_url, "configuration loaded");

    let client = StorageClient::with_timeout(&config.server_url, config.request_timeout())?;

    match args.command {
        Command::Upload {
            path,
            chunk_size,
            policy,
            name,
        } => {
            let chunk_size = chunk_size.unwrap_or(config.chunk_size);
            let policy = policy.unwrap_or(config.failure_policy);
            upload(client, &path, name.as_deref(), chunk_size, policy).await
        }
        Command::List => Ok(print_files(client.list_files().await)),
        Command::Search { pattern } => Ok(print_files(client.search(&pattern).await)),
        Command::Download { name, output } => {
            let dir = output.unwrap_or_else(|| config.download_dir());
            download(&client, &name, dir).await
        }
        Command::Url { name } => {
            println!("{}", client.download_url(&name)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn upload(
    client: StorageClient,
    path: &Path,
    name: Option<&str>,
    chunk_size: u64,
    policy: FailurePolicy,
) -> anyhow::Result<ExitCode> {
    if chunk_size == 0 {
        bail!("chunk size must be greater than zero");
    }

    let source = match name {
        Some(name) => FileSource::open_as(path, name),
        None => FileSource::open(path),
    }
    .with_context(|| format!("opening {}", path.display()))?;

    let mut sequencer = UploadSequencer::new(Arc::new(client)).with_policy(policy);
    let cancel = sequencer.cancel_token();
    let mut events = sequencer
        .take_events()
        .context("upload events already taken")?;

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Some(line) = render::progress_line(&event) {
                eprintln!("{line}");
            }
        }
    });

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, stopping after the current chunk");
            cancel.cancel();
        }
    });

    let report = sequencer.run(Arc::new(source), chunk_size).await;
    interrupt.abort();
    // Dropping the sequencer closes the event channel and ends the printer.
    drop(sequencer);
    let _ = printer.await;

    println!("{}", render::upload_summary(&report));
    Ok(if report.is_intact() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn download(client: &StorageClient, name: &str, dir: PathBuf) -> anyhow::Result<ExitCode> {
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;
    let file = client.download(name, &dir).await?;
    println!("saved {} ({} bytes)", file.path.display(), file.bytes);
    Ok(ExitCode::SUCCESS)
}

fn print_files(result: Result<Vec<String>, filedrop_client::Error>) -> ExitCode {
    if let Err(e) = &result {
        tracing::error!(error = %e, "request failed");
    }
    for line in render::file_lines(&result) {
        println!("{line}");
    }
    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
