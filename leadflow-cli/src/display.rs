//! Terminal rendering of task progress and results

use std::io::{self, Stdout, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use colored::*;
use leadflow_core::domain::status::TaskStatus;
use leadflow_core::domain::task::{ScrapeTaskStatus, TaskSnapshot, VerifyTaskStatus, format_elapsed};
use leadflow_workflow::TaskObserver;
use serde_json::Value as JsonValue;

/// Snapshot fields shown in the completion summary
pub trait Summary: TaskSnapshot {
    /// Label/value pairs printed under "Summary:"
    fn summary(&self) -> Vec<(&'static str, String)>;
}

impl Summary for ScrapeTaskStatus {
    fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Websites", self.total_urls.to_string()),
            ("Processed", self.urls_processed.to_string()),
            ("Elapsed", format_elapsed(self.time_elapsed_seconds)),
        ]
    }
}

impl Summary for VerifyTaskStatus {
    fn summary(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("Total emails", self.total_items.to_string()),
            ("Processed", self.items_processed.to_string()),
        ];
        if let Some(count) = self.authentic_email_count {
            lines.push(("Authentic", count.to_string()));
        }
        if let Some(file) = &self.output_file_name {
            lines.push(("Output file", file.clone()));
        }
        lines.push(("Elapsed", format_elapsed(self.time_elapsed_seconds)));
        lines
    }
}

/// Prints one progress line per poll
///
/// Terminal errors are not printed here; they come back from the workflow and
/// are reported once by the command.
pub struct ProgressPrinter<W = Stdout> {
    out: Mutex<W>,
}

impl ProgressPrinter {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ProgressPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<S: TaskSnapshot, W: Write + Send> TaskObserver<S> for ProgressPrinter<W> {
    fn on_update(&self, _task_id: &str, snapshot: &S) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        // A closed stdout only loses progress lines
        let _ = writeln!(out, "  {}", progress_line(snapshot));
    }
}

/// `STATUS  42% (21/50)  00:01:05`
pub fn progress_line<S: TaskSnapshot>(snapshot: &S) -> String {
    format!(
        "{:<18} {:>3.0}% ({}/{})  {}",
        colorize_status(snapshot.status()),
        snapshot.progress_percent(),
        snapshot.items_processed(),
        snapshot.total_items(),
        format_elapsed(snapshot.elapsed_seconds()),
    )
}

/// Print the full state of a task, as returned by a single status read
pub fn print_task_details<S: Summary>(task_id: &str, snapshot: &S) {
    println!("{}", "Task Details:".bold());
    println!("  ID:        {}", task_id.cyan());
    println!("  Status:    {}", colorize_status(snapshot.status()));
    println!("  Progress:  {:.0}%", snapshot.progress_percent());

    if let Some(error) = snapshot.error() {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }

    if *snapshot.status() == TaskStatus::Completed {
        print_completion(snapshot);
    }
}

/// Print the summary and results of a completed task
pub fn print_completion<S: Summary>(snapshot: &S) {
    println!("\n{}", "Summary:".bold());
    for (label, value) in snapshot.summary() {
        println!("  {:<12} {}", format!("{}:", label), value);
    }

    if let Some(result) = snapshot.result() {
        println!("\n{}", "Results:".bold());
        match serde_json::to_string_pretty(result) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{:?}", result),
        }
    }
}

/// Write the result payload of a completed task to `path` as JSON
pub fn write_results(path: &Path, result: Option<&JsonValue>) -> Result<()> {
    let payload = result.cloned().unwrap_or(JsonValue::Null);
    let json = serde_json::to_string_pretty(&payload).context("Failed to encode results")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;

    println!(
        "\n{} Results written to {}",
        "✓".green(),
        path.display().to_string().cyan()
    );
    Ok(())
}

/// Colorize a task status for display
pub fn colorize_status(status: &TaskStatus) -> ColoredString {
    let label = status.as_str();
    match status {
        TaskStatus::Pending => label.yellow(),
        TaskStatus::Completed => label.green(),
        TaskStatus::Failed => label.red(),
        _ => label.cyan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_progress_line() {
        colored::control::set_override(false);

        let snapshot = VerifyTaskStatus {
            status: TaskStatus::VerifyingEmails,
            total_items: 50,
            items_processed: 21,
            time_elapsed_seconds: 65.0,
            ..Default::default()
        };

        let line = progress_line(&snapshot);
        assert!(line.starts_with("VERIFYING_EMAILS"));
        assert!(line.contains(" 42% (21/50)"));
        assert!(line.ends_with("00:01:05"));
    }

    #[test]
    fn test_printer_reports_updates_but_not_errors() {
        colored::control::set_override(false);

        let printer = ProgressPrinter::new(Vec::new());
        let snapshot = ScrapeTaskStatus {
            status: TaskStatus::Scraping,
            total_urls: 4,
            urls_processed: 1,
            ..Default::default()
        };

        TaskObserver::on_update(&printer, "t-1", &snapshot);
        TaskObserver::<ScrapeTaskStatus>::on_error(
            &printer,
            "t-1",
            &leadflow_workflow::WorkflowError::TaskNotFound {
                task_id: "t-1".to_string(),
            },
        );

        let written = String::from_utf8(printer.out.into_inner().unwrap()).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert!(written.contains("SCRAPING"));
        assert!(written.contains("25% (1/4)"));
        assert!(!written.contains("not found"));
    }

    #[test]
    fn test_verify_summary_includes_optional_fields() {
        let snapshot = VerifyTaskStatus {
            status: TaskStatus::Completed,
            total_items: 3,
            items_processed: 3,
            authentic_email_count: Some(2),
            output_file_name: Some("verified.xlsx".to_string()),
            ..Default::default()
        };

        let summary = snapshot.summary();
        assert!(summary.contains(&("Authentic", "2".to_string())));
        assert!(summary.contains(&("Output file", "verified.xlsx".to_string())));

        let bare = VerifyTaskStatus::default();
        assert!(bare.summary().iter().all(|(label, _)| *label != "Authentic"));
    }

    #[test]
    fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let data = json!([{ "url": "https://a.com", "emails": ["info@a.com"] }]);

        write_results(&path, Some(&data)).unwrap();

        let written: JsonValue =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, data);
    }
}
