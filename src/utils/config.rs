// src/utils/config.rs
use crate::utils::error::AppError;
use std::time::Duration;

/// Default SEC user agent. The SEC requires contact details; override with `EDGAR_USER_AGENT`.
pub const DEFAULT_USER_AGENT: &str = "filing_insights/0.1 (ops@example.com)";
// SEC asks for 10 requests/second max. Be conservative. >100ms delay.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 150;

/// Runtime settings for talking to EDGAR, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub user_agent: String,
    pub request_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
        }
    }
}

impl AppConfig {
    /// Reads `EDGAR_USER_AGENT` and `EDGAR_REQUEST_DELAY_MS`, falling back to defaults.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(agent) = lookup("EDGAR_USER_AGENT") {
            let agent = agent.trim();
            if agent.is_empty() {
                return Err(AppError::Config("EDGAR_USER_AGENT is set but empty".to_string()));
            }
            config.user_agent = agent.to_string();
        }

        if let Some(delay) = lookup("EDGAR_REQUEST_DELAY_MS") {
            let millis = delay.trim().parse::<u64>().map_err(|e| {
                AppError::Config(format!("Invalid EDGAR_REQUEST_DELAY_MS '{}': {}", delay, e))
            })?;
            config.request_delay = Duration::from_millis(millis);
        }

        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}
