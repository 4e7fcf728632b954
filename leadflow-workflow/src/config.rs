//! Workflow configuration
//!
//! Defines where the lead automation API lives and how its task-status
//! endpoints are polled.

use std::time::Duration;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Delay between two status checks of the same task
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Workflow configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL (e.g., "http://127.0.0.1:8000")
    pub api_url: String,

    /// How often to read the status of the tracked task
    pub poll_interval: Duration,

    /// Upper bound for a single status read; `None` waits indefinitely.
    /// A status read that exceeds it is retried on the next tick.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Creates a new configuration with default polling settings
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: None,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.poll_interval, Duration::from_millis(3000));
        assert_eq!(config.request_timeout, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Invalid URL should fail
        config.api_url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        config.api_url = String::new();
        assert!(config.validate().is_err());

        config.api_url = "https://leads.example.com".to_string();
        assert!(config.validate().is_ok());

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.request_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());

        config.request_timeout = Some(Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }
}
