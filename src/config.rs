//! Portal configuration.
//!
//! Loaded from an optional JSON file, then overridden by environment
//! variables. Only the backend base URL and its public API key reach the
//! portal; OAuth client credentials live on the backend.

use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use cloudops_gateway::{GatewayError, GatewayResult, RetryPolicy};

pub const ENV_API_URL: &str = "CLOUDOPS_API_URL";
pub const ENV_API_KEY: &str = "CLOUDOPS_API_KEY";
pub const ENV_REDIRECT_URI: &str = "CLOUDOPS_REDIRECT_URI";
pub const ENV_MAX_ATTEMPTS: &str = "CLOUDOPS_MAX_ATTEMPTS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PortalConfig {
    /// Backend base URL, e.g. `https://xyz.example.co`.
    pub api_url: String,
    /// Public (anon) API key for the backend.
    pub api_key: String,
    /// Backend function that proxies the monitoring provider.
    pub monitor_function: String,
    /// Backend function that owns the OAuth client.
    pub auth_function: String,
    pub redirect_uri: String,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            monitor_function: "cloud-monitor".into(),
            auth_function: "cloud-auth".into(),
            redirect_uri: "http://localhost:8080/auth/callback".into(),
            max_attempts: 3,
            base_delay_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}

impl PortalConfig {
    /// File (if given) then process environment.
    pub fn load(path: Option<&Path>) -> GatewayResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> GatewayResult<Self> {
        debug!("loading portal config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::configuration(format!(
                "Portal config not configured: cannot read {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            GatewayError::configuration(format!(
                "Portal config not configured correctly in {}: {e}",
                path.display()
            ))
        })
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_API_URL) {
            self.api_url = v;
        }
        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = v;
        }
        if let Some(v) = get(ENV_REDIRECT_URI) {
            self.redirect_uri = v;
        }
        if let Some(n) = get(ENV_MAX_ATTEMPTS).and_then(|v| v.trim().parse().ok()) {
            self.max_attempts = n;
        }
    }

    /// Missing values are configuration errors, which the gateway never retries.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.api_url.trim().is_empty() {
            return Err(GatewayError::configuration(format!(
                "Backend URL not configured (set {ENV_API_URL})"
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(GatewayError::configuration(format!(
                "Backend API key not configured (set {ENV_API_KEY})"
            )));
        }
        if self.max_attempts == 0 {
            return Err(GatewayError::configuration("maxAttempts must be at least 1"));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
