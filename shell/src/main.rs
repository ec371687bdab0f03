//! licgate desktop shell
//!
//! Stands in for the application window: it wires the license session to the
//! host's file-backed record store and the local clock, then runs one
//! navigation or license command.
//!
//! Usage:
//!   licgate status
//!   licgate activate <KEY>
//!   licgate open /xls

use std::{path::PathBuf, process::ExitCode, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use licgate_license::{FileRecordStore, LicenseSession, SystemClock};
use licgate_shell::{execute, Command};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "licgate")]
#[command(about = "License-gated application shell")]
struct Args {
    /// Path to the license record file (defaults to the user config directory)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let store_path = match args.store {
        Some(path) => path,
        None => FileRecordStore::default_location()
            .context("no config directory on this platform; pass --store")?,
    };
    debug!(path = %store_path.display(), "Using license record store");

    let session = Arc::new(LicenseSession::new(
        Arc::new(FileRecordStore::new(store_path)),
        Arc::new(SystemClock),
    ));

    let report = execute(&session, &args.command).await?;
    println!("{}", report.text);
    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
