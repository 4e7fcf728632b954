//! Extract command handler
//!
//! Submits websites for email extraction and follows the scraping task.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use leadflow_core::input::{EntryFormat, split_entries};
use leadflow_workflow::{Config, ScrapeBackend, TaskWorkflow};

use super::{TaskKind, client, follow};
use crate::display::ProgressPrinter;

/// Arguments of `leadflow extract`
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Website URLs to scan
    pub urls: Vec<String>,

    /// Text or CSV file with one URL per line or cell
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Write the extracted emails to this file as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExtractArgs {
    /// Raw URL entries from the command line followed by the file, if any
    pub fn entries(&self) -> Result<Vec<String>> {
        let mut entries = self.urls.clone();

        if let Some(path) = &self.file {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read URL file: {}", path.display()))?;
            let format = EntryFormat::from_file_name(&path.to_string_lossy());
            entries.extend(split_entries(&text, format));
        }

        Ok(entries)
    }
}

/// Handle `leadflow extract`
pub async fn handle_extract(args: ExtractArgs, config: &Config) -> Result<()> {
    let entries = args.entries()?;

    let mut workflow = TaskWorkflow::new(Arc::new(ScrapeBackend::new(client(config))), config);
    let task_id = workflow
        .submit(entries, Arc::new(ProgressPrinter::stdout()))
        .await
        .context("Failed to start email extraction")?;

    println!("{} Extraction started", "✓".green());
    println!("  Task ID: {}", task_id.cyan());
    println!();

    follow(&mut workflow, TaskKind::Scrape, args.output.as_deref()).await
}
