//! Server configuration read from the environment.

use std::time::Duration;

use portalshell_core::address::Address;
use portalshell_orchestrator::ShellConfig;

use crate::error::AppError;

/// Everything the server binary needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Location the headless shell starts at.
    pub start_address: Address,
    /// Settings passed to the shell.
    pub shell: ShellConfig,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `HOST` | `0.0.0.0` |
    /// | `PORT` | `3000` |
    /// | `SHELL_START_ADDRESS` | required |
    /// | `NEGOTIATION_INTERVAL_MS` | `200` |
    /// | `VIEW_STATE_FIELDS` | `cameraMatrix` (comma separated) |
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;

        let raw_start = lookup("SHELL_START_ADDRESS").ok_or_else(|| {
            AppError::Config("SHELL_START_ADDRESS environment variable must be set".to_string())
        })?;
        let start_address = Address::parse(&raw_start)
            .map_err(|e| AppError::Config(format!("SHELL_START_ADDRESS is invalid: {e}")))?;

        let mut shell = ShellConfig::default();
        if let Some(raw) = lookup("NEGOTIATION_INTERVAL_MS") {
            let millis: u64 = raw.parse().map_err(|e| {
                AppError::Config(format!("NEGOTIATION_INTERVAL_MS must be a number: {e}"))
            })?;
            if millis == 0 {
                return Err(AppError::Config(
                    "NEGOTIATION_INTERVAL_MS must be greater than zero".to_string(),
                ));
            }
            shell.negotiation_interval = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup("VIEW_STATE_FIELDS") {
            shell.view_state_fields = raw
                .split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_owned)
                .collect();
        }

        Ok(Self {
            host,
            port,
            start_address,
            shell,
        })
    }
}
