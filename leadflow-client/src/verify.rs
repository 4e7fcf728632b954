//! Email verification endpoints

use crate::LeadClient;
use crate::error::Result;
use leadflow_core::domain::task::VerifyTaskStatus;
use leadflow_core::dto::TaskCreated;
use leadflow_core::dto::verify::{UploadFields, VerifyEmailsRequest};
use reqwest::multipart::{Form, Part};
use tracing::debug;

impl LeadClient {
    // =============================================================================
    // Email Verification
    // =============================================================================

    /// Start verifying a list of email addresses
    ///
    /// # Arguments
    /// * `req` - The emails to verify and whether to save results to a file
    ///
    /// # Returns
    /// The creation response
    pub async fn verify_emails(&self, req: &VerifyEmailsRequest) -> Result<TaskCreated> {
        let url = format!("{}/verify/array", self.base_url);
        debug!("Submitting {} email(s) for verification", req.emails.len());
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Start verifying the emails of an uploaded spreadsheet
    ///
    /// The file is sent as multipart form data together with the column and
    /// row fields; the service does the parsing.
    ///
    /// # Arguments
    /// * `file_name` - Name reported for the uploaded file (drives format detection)
    /// * `contents` - Raw file bytes
    /// * `fields` - Column and row selection
    ///
    /// # Returns
    /// The creation response
    pub async fn verify_upload(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        fields: &UploadFields,
    ) -> Result<TaskCreated> {
        let url = format!("{}/verify/upload", self.base_url);

        let mut form = Form::new().part(
            "file",
            Part::bytes(contents).file_name(file_name.to_string()),
        );
        for (name, value) in fields.pairs() {
            form = form.text(name, value.to_string());
        }

        debug!("Uploading {} for verification", file_name);
        let response = self.client.post(&url).multipart(form).send().await?;

        self.handle_response(response).await
    }

    /// Get the status of an email verification task
    ///
    /// # Arguments
    /// * `task_id` - The task id returned by a verification call
    ///
    /// # Returns
    /// The latest status snapshot, or [`crate::ClientError::NotFound`] if the
    /// task is unknown or expired
    pub async fn get_verify_status(&self, task_id: &str) -> Result<VerifyTaskStatus> {
        let url = format!("{}/email/verify/status/{}", self.base_url, task_id);
        let response = self.client.get(&url).send().await?;

        self.handle_status_response(task_id, response).await
    }
}
