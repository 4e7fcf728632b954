//! Task command handlers
//!
//! Reads or follows tasks that were submitted earlier, by id.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use leadflow_client::ClientError;
use leadflow_workflow::{Config, ScrapeBackend, TaskWorkflow, VerifyBackend};

use super::{client, follow};
use crate::display::{self, ProgressPrinter};

/// Service a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskKind {
    /// Website email extraction
    Scrape,
    /// Email verification
    Verify,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Scrape => "scrape",
            TaskKind::Verify => "verify",
        }
    }
}

/// Read and print the status of a task once
pub async fn show_status(task_id: &str, kind: TaskKind, config: &Config) -> Result<()> {
    let client = client(config);

    match kind {
        TaskKind::Scrape => {
            let status = client
                .get_scrape_status(task_id)
                .await
                .map_err(|e| not_found_context(e, task_id))?;
            display::print_task_details(task_id, &status);
        }
        TaskKind::Verify => {
            let status = client
                .get_verify_status(task_id)
                .await
                .map_err(|e| not_found_context(e, task_id))?;
            display::print_task_details(task_id, &status);
        }
    }

    Ok(())
}

/// Poll an existing task until it ends
pub async fn watch(
    task_id: &str,
    kind: TaskKind,
    output: Option<&Path>,
    config: &Config,
) -> Result<()> {
    println!("Following task {}", task_id.cyan());
    println!();

    match kind {
        TaskKind::Scrape => {
            let mut workflow =
                TaskWorkflow::new(Arc::new(ScrapeBackend::new(client(config))), config);
            workflow.track(task_id, Arc::new(ProgressPrinter::stdout()));
            follow(&mut workflow, kind, output).await
        }
        TaskKind::Verify => {
            let mut workflow =
                TaskWorkflow::new(Arc::new(VerifyBackend::new(client(config))), config);
            workflow.track(task_id, Arc::new(ProgressPrinter::stdout()));
            follow(&mut workflow, kind, output).await
        }
    }
}

fn not_found_context(error: ClientError, task_id: &str) -> anyhow::Error {
    if error.is_not_found() {
        anyhow::anyhow!("Task {} not found; it may have expired", task_id)
    } else {
        anyhow::Error::new(error).context(format!("Failed to read status of task {}", task_id))
    }
}
