//! Email verification backend
//!
//! Emails can come from three places: typed or pasted addresses, an uploaded
//! spreadsheet, or a Google Sheet range. Sheet ranges are read by the service
//! first and then verified like typed addresses.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use leadflow_client::{ClientError, LeadClient};
use leadflow_core::domain::task::VerifyTaskStatus;
use leadflow_core::dto::TaskCreated;
use leadflow_core::dto::sheet::SheetExtractRequest;
use leadflow_core::dto::verify::{UploadFields, VerifyEmailsRequest};
use leadflow_core::input::{RowRange, is_http_url, normalize_emails};
use tracing::info;

use crate::error::WorkflowError;
use crate::scheduler::StatusSource;
use crate::service::TaskBackend;

/// Where the emails to verify come from
#[derive(Debug, Clone, PartialEq)]
pub enum VerifySource {
    /// Addresses given directly
    Emails {
        emails: Vec<String>,
        /// Ask the service to also write results to a file
        save_to_file: bool,
    },
    /// A spreadsheet (.txt, .csv, .xlsx) parsed by the service
    Upload {
        path: PathBuf,
        email_column: String,
        url_column: String,
        rows: RowRange,
    },
    /// A column range of a Google Sheet
    Sheet {
        sheet_url: String,
        column: String,
        rows: RowRange,
    },
}

/// Submits emails for verification and polls `GET /email/verify/status/{id}`
pub struct VerifyBackend {
    client: Arc<LeadClient>,
}

impl VerifyBackend {
    pub fn new(client: Arc<LeadClient>) -> Self {
        Self { client }
    }

    async fn verify_emails(
        &self,
        raw: &[String],
        save_to_file: Option<bool>,
        empty_reason: &str,
    ) -> Result<TaskCreated, WorkflowError> {
        let emails = normalize_emails(raw);
        if emails.is_empty() {
            return Err(WorkflowError::Validation(empty_reason.to_string()));
        }

        info!("Submitting {} email(s) for verification", emails.len());

        self.client
            .verify_emails(&VerifyEmailsRequest {
                emails,
                save_to_file,
            })
            .await
            .map_err(initiation)
    }

    async fn verify_upload(
        &self,
        path: PathBuf,
        email_column: String,
        url_column: String,
        rows: RowRange,
    ) -> Result<TaskCreated, WorkflowError> {
        if !rows.is_valid() {
            return Err(WorkflowError::Validation("invalid row range".to_string()));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                WorkflowError::Validation(format!("{} is not a file", path.display()))
            })?;

        let contents = tokio::fs::read(&path).await.map_err(|e| {
            WorkflowError::Validation(format!("cannot read {}: {}", path.display(), e))
        })?;
        if contents.is_empty() {
            return Err(WorkflowError::Validation("empty file".to_string()));
        }

        let fields = UploadFields {
            email_column: email_column.trim().to_string(),
            url_column: url_column.trim().to_string(),
            start_row: rows.start_field(),
            end_row: rows.end_field(),
        };

        info!(
            "Uploading {} ({} bytes) for verification",
            file_name,
            contents.len()
        );

        self.client
            .verify_upload(&file_name, contents, &fields)
            .await
            .map_err(initiation)
    }

    async fn verify_sheet(
        &self,
        sheet_url: String,
        column: String,
        rows: RowRange,
    ) -> Result<TaskCreated, WorkflowError> {
        let sheet_url = sheet_url.trim().to_string();
        if !is_http_url(&sheet_url) {
            return Err(WorkflowError::Validation(
                "invalid Google Sheet URL".to_string(),
            ));
        }
        if !rows.is_valid() {
            return Err(WorkflowError::Validation("invalid row range".to_string()));
        }

        let extracted = self
            .client
            .extract_sheet_emails(&SheetExtractRequest {
                sheet_url,
                column: column.trim().to_string(),
                start_row: rows.start_field(),
                end_row: rows.end_field(),
            })
            .await
            .map_err(initiation)?;

        info!("Read {} email(s) from the Google Sheet", extracted.emails.len());

        self.verify_emails(
            &extracted.emails,
            None,
            "no emails found in the Google Sheet",
        )
        .await
    }
}

fn initiation(error: ClientError) -> WorkflowError {
    WorkflowError::Initiation(error.to_string())
}

#[async_trait]
impl StatusSource for VerifyBackend {
    type Snapshot = VerifyTaskStatus;

    async fn fetch_status(&self, task_id: &str) -> Result<VerifyTaskStatus, ClientError> {
        self.client.get_verify_status(task_id).await
    }
}

#[async_trait]
impl TaskBackend for VerifyBackend {
    type Input = VerifySource;

    async fn submit(&self, input: VerifySource) -> Result<TaskCreated, WorkflowError> {
        match input {
            VerifySource::Emails {
                emails,
                save_to_file,
            } => {
                self.verify_emails(&emails, Some(save_to_file), "no email addresses provided")
                    .await
            }
            VerifySource::Upload {
                path,
                email_column,
                url_column,
                rows,
            } => {
                self.verify_upload(path, email_column, url_column, rows)
                    .await
            }
            VerifySource::Sheet {
                sheet_url,
                column,
                rows,
            } => self.verify_sheet(sheet_url, column, rows).await,
        }
    }
}
