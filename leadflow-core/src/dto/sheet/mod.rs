//! Google Sheet extraction DTOs

use serde::{Deserialize, Serialize};

/// Request to read emails out of a Google Sheet column (`POST /extract/sheet`)
///
/// Rows are sent as strings; an empty `end_row` reads to the end of the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetExtractRequest {
    pub sheet_url: String,
    pub column: String,
    pub start_row: String,
    pub end_row: String,
}

/// Emails found in the requested sheet range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetExtractResponse {
    #[serde(default)]
    pub emails: Vec<String>,
}
