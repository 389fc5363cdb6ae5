mod cli;
mod controller;
mod engine;
mod export;
mod format;
mod ledger;
mod model;
mod session;
mod stats;
mod storage;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args).await
}
