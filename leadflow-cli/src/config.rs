//! Configuration module
//!
//! Global CLI flags and their translation into the workflow configuration.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use leadflow_workflow::Config;
use leadflow_workflow::config::{DEFAULT_API_URL, DEFAULT_POLL_INTERVAL};

/// Flags shared by every subcommand
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Lead automation API URL
    #[arg(long, global = true, env = "LEADFLOW_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Delay between two status checks, in milliseconds
    #[arg(
        long,
        global = true,
        env = "LEADFLOW_POLL_INTERVAL_MS",
        default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64
    )]
    pub poll_interval_ms: u64,

    /// Upper bound for a single status check, in seconds
    #[arg(long, global = true, env = "LEADFLOW_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl GlobalArgs {
    /// Builds and validates the workflow configuration
    pub fn to_config(&self) -> Result<Config> {
        let config = Config {
            api_url: self.api_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        };

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}
