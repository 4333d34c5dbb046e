//! REST client for the hosted backend.
//!
//! Tables are exposed PostgREST-style under `/rest/v1/{table}` with
//! `eq.`/`in.(…)` filter operators; writes prefer minimal response bodies.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::sync::RwLock;
use std::time::Duration;

use vigil_core::session::SessionProvider;
use vigil_core::sync::SyncTable;

use crate::backend::RemoteBackend;
use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::types::{ApiErrorResponse, RemoteFilter, Session};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Client for the hosted table API. Holds the cached auth session; the
/// auth layer refreshes it through [`RestBackend::set_session`].
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    session: RwLock<Option<Session>>,
}

impl RestBackend {
    pub fn new(config: RemoteConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
            session: RwLock::new(None),
        }
    }

    /// Replace the cached session (None on sign-out).
    pub fn set_session(&self, session: Option<Session>) {
        if let Ok(mut guard) = self.session.write() {
            *guard = session;
        }
    }

    fn session_snapshot(&self) -> Option<Session> {
        self.session.read().ok().and_then(|guard| guard.clone())
    }

    fn table_url(&self, table: SyncTable) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.table_name())
    }

    fn record_url(&self, table: SyncTable, record_id: &str) -> String {
        format!(
            "{}?id=eq.{}",
            self.table_url(table),
            urlencoding::encode(record_id)
        )
    }

    /// Create headers for an API request; requires a cached session.
    fn headers(&self) -> RemoteResult<HeaderMap> {
        let session = self
            .session_snapshot()
            .ok_or_else(|| RemoteError::auth("No session cached. Please sign in first."))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let api_key_value = HeaderValue::from_str(&self.api_key)
            .map_err(|_| RemoteError::auth("Invalid API key format"))?;
        headers.insert("apikey", api_key_value);

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", session.access_token))
            .map_err(|_| RemoteError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("[Remote] API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("[Remote] API response error ({}): {}", status, preview);
    }

    fn api_error(status: reqwest::StatusCode, body: &str) -> RemoteError {
        if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(body) {
            let message = if error.code.is_empty() {
                error.message
            } else {
                format!("{}: {}", error.code, error.message)
            };
            return RemoteError::api(status.as_u16(), message);
        }
        RemoteError::api(status.as_u16(), format!("Request failed: {}", body))
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> RemoteResult<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "[Remote] Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            RemoteError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    /// Check a write response, ignoring any (minimal) body.
    async fn parse_write_response(response: reqwest::Response) -> RemoteResult<()> {
        let status = response.status();
        if status.is_success() {
            debug!("[Remote] API response status: {}", status);
            return Ok(());
        }
        let body = response.text().await?;
        Self::log_response(status, &body);
        Err(Self::api_error(status, &body))
    }
}

#[async_trait]
impl RemoteBackend for RestBackend {
    async fn insert(&self, table: SyncTable, record: serde_json::Value) -> RemoteResult<()> {
        let response = self
            .client
            .post(self.table_url(table))
            .headers(self.headers()?)
            .header("Prefer", "return=minimal")
            .json(&record)
            .send()
            .await?;
        Self::parse_write_response(response).await
    }

    async fn update(
        &self,
        table: SyncTable,
        record_id: &str,
        record: serde_json::Value,
    ) -> RemoteResult<()> {
        let response = self
            .client
            .patch(self.record_url(table, record_id))
            .headers(self.headers()?)
            .header("Prefer", "return=minimal")
            .json(&record)
            .send()
            .await?;
        Self::parse_write_response(response).await
    }

    async fn delete(&self, table: SyncTable, record_id: &str) -> RemoteResult<()> {
        let response = self
            .client
            .delete(self.record_url(table, record_id))
            .headers(self.headers()?)
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        Self::parse_write_response(response).await
    }

    async fn select_where(
        &self,
        table: SyncTable,
        filters: &[RemoteFilter],
    ) -> RemoteResult<Vec<serde_json::Value>> {
        let mut query: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        query.extend(filters.iter().map(RemoteFilter::to_query_pair));

        let response = self
            .client
            .get(self.table_url(table))
            .headers(self.headers()?)
            .query(&query)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Answers from the cached session; the offline core treats an absent
    /// session as "nothing to sync".
    async fn current_user(&self) -> RemoteResult<Option<String>> {
        Ok(self.session_snapshot().map(|session| session.user_id))
    }
}

impl SessionProvider for RestBackend {
    fn current_user(&self) -> Option<String> {
        self.session_snapshot().map(|session| session.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> RestBackend {
        RestBackend::new(RemoteConfig::new("https://api.vigil.app/", "anon-key"))
    }

    #[test]
    fn table_urls_are_rooted_under_rest_v1() {
        let backend = backend();
        assert_eq!(
            backend.table_url(SyncTable::FastBlocks),
            "https://api.vigil.app/rest/v1/fast_blocks"
        );
        assert_eq!(
            backend.record_url(SyncTable::Fasts, "f 1"),
            "https://api.vigil.app/rest/v1/fasts?id=eq.f%201"
        );
    }

    #[test]
    fn headers_require_a_cached_session() {
        let backend = backend();
        assert!(matches!(backend.headers(), Err(RemoteError::Auth(_))));

        backend.set_session(Some(Session {
            access_token: "token".to_string(),
            user_id: "u1".to_string(),
        }));
        let headers = backend.headers().expect("headers");
        assert_eq!(headers.get("apikey").unwrap(), "anon-key");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer token");
    }

    #[tokio::test]
    async fn current_user_reflects_the_cached_session() {
        let backend = backend();
        assert_eq!(
            RemoteBackend::current_user(&backend).await.expect("user"),
            None
        );

        backend.set_session(Some(Session {
            access_token: "token".to_string(),
            user_id: "u1".to_string(),
        }));
        assert_eq!(
            RemoteBackend::current_user(&backend).await.expect("user"),
            Some("u1".to_string())
        );
        assert_eq!(SessionProvider::current_user(&backend), Some("u1".to_string()));
    }

    #[test]
    fn api_errors_prefer_structured_bodies() {
        let err = RestBackend::api_error(
            reqwest::StatusCode::CONFLICT,
            "{\"code\":\"23505\",\"message\":\"duplicate key value\"}",
        );
        match err {
            RemoteError::Api { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "23505: duplicate key value");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
