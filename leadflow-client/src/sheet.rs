//! Google Sheet extraction endpoint

use crate::LeadClient;
use crate::error::Result;
use leadflow_core::dto::sheet::{SheetExtractRequest, SheetExtractResponse};

impl LeadClient {
    /// Read the emails found in a column range of a Google Sheet
    ///
    /// This call is synchronous on the service side; no task is created.
    ///
    /// # Arguments
    /// * `req` - Sheet URL, column and row window
    ///
    /// # Returns
    /// The emails found, possibly none
    pub async fn extract_sheet_emails(
        &self,
        req: &SheetExtractRequest,
    ) -> Result<SheetExtractResponse> {
        let url = format!("{}/extract/sheet", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }
}
