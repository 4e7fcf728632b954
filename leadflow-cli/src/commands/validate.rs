//! Validate command handler
//!
//! Verifies emails typed on the command line, read from a bulk text file,
//! uploaded as a spreadsheet or pulled from a Google Sheet.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use leadflow_core::input::{EntryFormat, RowRange, split_entries};
use leadflow_workflow::{Config, TaskWorkflow, VerifyBackend, VerifySource};

use super::{TaskKind, client, follow};
use crate::display::ProgressPrinter;

/// Arguments of `leadflow validate`
///
/// When several sources are given, the Google Sheet wins, then typed and bulk
/// emails, then the uploaded file.
#[derive(Debug, Default, Args)]
pub struct ValidateArgs {
    /// Email address to verify (repeatable, or comma separated)
    #[arg(short, long = "email", value_delimiter = ',')]
    pub emails: Vec<String>,

    /// Text file with one email per line
    #[arg(short, long)]
    pub bulk: Option<PathBuf>,

    /// Do not ask the service to save results to a file
    #[arg(long)]
    pub no_save: bool,

    /// Spreadsheet (.txt, .csv, .xlsx) uploaded for verification
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Column holding the emails in the uploaded file
    #[arg(long, default_value = "")]
    pub email_column: String,

    /// Column holding the source URLs in the uploaded file
    #[arg(long, default_value = "")]
    pub url_column: String,

    /// Google Sheet to read emails from
    #[arg(long)]
    pub sheet_url: Option<String>,

    /// Column holding the emails in the Google Sheet
    #[arg(long, default_value = "")]
    pub column: String,

    /// First row to read (1-based)
    #[arg(long, default_value_t = 1)]
    pub start_row: u32,

    /// Last row to read; defaults to the last row
    #[arg(long)]
    pub end_row: Option<u32>,

    /// Write the verification results to this file as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ValidateArgs {
    fn rows(&self) -> RowRange {
        RowRange::new(self.start_row, self.end_row)
    }

    /// Picks the email source to submit
    pub fn source(&self) -> Result<VerifySource> {
        if let Some(sheet_url) = self.sheet_url.as_ref().filter(|url| !url.trim().is_empty()) {
            return Ok(VerifySource::Sheet {
                sheet_url: sheet_url.clone(),
                column: self.column.clone(),
                rows: self.rows(),
            });
        }

        let mut emails = self.emails.clone();
        if let Some(path) = &self.bulk {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read email file: {}", path.display()))?;
            emails.extend(split_entries(&text, EntryFormat::Lines));
        }

        let typed = emails.iter().any(|email| !email.trim().is_empty());
        if let (false, Some(path)) = (typed, &self.file) {
            return Ok(VerifySource::Upload {
                path: path.clone(),
                email_column: self.email_column.clone(),
                url_column: self.url_column.clone(),
                rows: self.rows(),
            });
        }

        Ok(VerifySource::Emails {
            emails,
            save_to_file: !self.no_save,
        })
    }
}

/// Handle `leadflow validate`
pub async fn handle_validate(args: ValidateArgs, config: &Config) -> Result<()> {
    let source = args.source()?;

    let mut workflow = TaskWorkflow::new(Arc::new(VerifyBackend::new(client(config))), config);
    let task_id = workflow
        .submit(source, Arc::new(ProgressPrinter::stdout()))
        .await
        .context("Failed to start email verification")?;

    println!("{} Verification started", "✓".green());
    println!("  Task ID: {}", task_id.cyan());
    println!();

    follow(&mut workflow, TaskKind::Verify, args.output.as_deref()).await
}
