//! Scrape DTOs
//!
//! Bodies for website email extraction.

use serde::{Deserialize, Serialize};

/// Request to start scraping a list of websites (`POST /scrape`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// Normalized, deduplicated absolute http(s) URLs
    pub urls: Vec<String>,
}
