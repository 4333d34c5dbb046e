//! Environment-driven client configuration.

use crate::error::{RemoteError, RemoteResult};

const API_URL_VAR: &str = "VIGIL_API_URL";
const API_KEY_VAR: &str = "VIGIL_API_KEY";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Resolve from `VIGIL_API_URL` / `VIGIL_API_KEY`.
    pub fn from_env() -> RemoteResult<Self> {
        let base_url = std::env::var(API_URL_VAR)
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                RemoteError::invalid_request(format!(
                    "{} not configured. Remote operations are disabled.",
                    API_URL_VAR
                ))
            })?;
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                RemoteError::invalid_request(format!(
                    "{} not configured. Remote operations are disabled.",
                    API_KEY_VAR
                ))
            })?;
        Ok(Self { base_url, api_key })
    }
}
