//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod extract;
mod task;
mod validate;

pub use extract::ExtractArgs;
pub use task::TaskKind;
pub use validate::ValidateArgs;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use leadflow_client::LeadClient;
use leadflow_core::domain::task::TaskSnapshot;
use leadflow_workflow::{Config, TaskBackend, TaskWorkflow};

use crate::display::{self, Summary};

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Extract email addresses from websites
    Extract(ExtractArgs),
    /// Verify email addresses
    Validate(ValidateArgs),
    /// Show the current status of a task
    Status {
        /// Task ID returned when the task was submitted
        task_id: String,

        /// Which service the task belongs to
        #[arg(short, long, value_enum, default_value_t = TaskKind::Scrape)]
        kind: TaskKind,
    },
    /// Follow an existing task until it ends
    Watch {
        /// Task ID returned when the task was submitted
        task_id: String,

        /// Which service the task belongs to
        #[arg(short, long, value_enum, default_value_t = TaskKind::Scrape)]
        kind: TaskKind,

        /// Write the final results to this file as JSON
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Extract(args) => extract::handle_extract(args, config).await,
        Commands::Validate(args) => validate::handle_validate(args, config).await,
        Commands::Status { task_id, kind } => task::show_status(&task_id, kind, config).await,
        Commands::Watch {
            task_id,
            kind,
            output,
        } => task::watch(&task_id, kind, output.as_deref(), config).await,
    }
}

/// Shared HTTP client for one command run
fn client(config: &Config) -> Arc<LeadClient> {
    Arc::new(LeadClient::new(config.api_url.clone()))
}

/// Waits for the tracked task to end, or for Ctrl-C
///
/// Prints the completion summary and optionally writes the results. A failed
/// or expired task is returned as an error; Ctrl-C stops polling and returns
/// normally.
async fn follow<B>(
    workflow: &mut TaskWorkflow<B>,
    kind: TaskKind,
    output: Option<&Path>,
) -> Result<()>
where
    B: TaskBackend,
    B::Snapshot: Summary,
{
    let task_id = workflow
        .task()
        .map(|task| task.id)
        .unwrap_or_default();

    let finished = tokio::select! {
        result = workflow.wait() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let Some(result) = finished else {
        workflow.cancel();
        println!(
            "\n{} Stopped following task {}",
            "⚠".yellow(),
            task_id.cyan()
        );
        println!(
            "{}",
            format!(
                "  Resume with: leadflow watch {} --kind {}",
                task_id,
                kind.as_str()
            )
            .dimmed()
        );
        return Ok(());
    };

    let snapshot = result?;
    println!("\n{} Task {} completed", "✓".green(), task_id.cyan());
    display::print_completion(&snapshot);

    if let Some(path) = output {
        display::write_results(path, snapshot.result())?;
    }

    Ok(())
}
