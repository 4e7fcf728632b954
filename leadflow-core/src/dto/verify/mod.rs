//! Email verification DTOs

use serde::{Deserialize, Serialize};

/// Request to verify a list of emails (`POST /verify/array`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyEmailsRequest {
    pub emails: Vec<String>,

    /// Ask the service to also write the results to a file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_to_file: Option<bool>,
}

/// Text fields sent alongside the spreadsheet in `POST /verify/upload`
///
/// The service expects every field as a string; empty means "not set".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFields {
    pub email_column: String,
    pub url_column: String,
    pub start_row: String,
    pub end_row: String,
}

impl UploadFields {
    /// Form field names and values, in the order the service documents them
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("email_column", self.email_column.as_str()),
            ("url_column", self.url_column.as_str()),
            ("start_row", self.start_row.as_str()),
            ("end_row", self.end_row.as_str()),
        ]
    }
}
