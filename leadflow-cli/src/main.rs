//! Leadflow CLI
//!
//! Command-line front end for the lead automation service: website email
//! extraction, email verification and task tracking.

mod commands;
mod config;
mod display;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::GlobalArgs;

#[derive(Parser)]
#[command(name = "leadflow")]
#[command(about = "Lead automation CLI: extract and verify emails", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries results, diagnostics go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadflow_cli=warn,leadflow_workflow=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.global.no_color {
        colored::control::set_override(false);
    }

    let config = cli.global.to_config()?;

    handle_command(cli.command, &config).await
}
