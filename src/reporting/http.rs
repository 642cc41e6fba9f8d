//! HTTP adapter for the learning backend.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ReportError, ReportResult};
use crate::models::EmotionSample;

use super::{ReportingBackend, SessionId};

/// Configuration for the backend HTTP client.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL of the session store
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl HttpBackendConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("EMOSENSE_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            timeout: Duration::from_secs(
                std::env::var("EMOSENSE_BACKEND_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}

#[derive(Deserialize)]
struct StartSessionResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    session_id: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the session store HTTP API.
pub struct HttpBackend {
    http: Client,
    config: HttpBackendConfig,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> ReportResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ReportError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ReportResult<Self> {
        Self::new(HttpBackendConfig::from_env())
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> ReportResult<reqwest::Response> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::RequestFailed(format!(
                "backend returned {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl ReportingBackend for HttpBackend {
    async fn start_session(&self, subject: &str) -> ReportResult<SessionId> {
        debug!("starting backend session for subject {subject}");

        let response = self
            .post_json("/api/session/start", json!({ "subject": subject }))
            .await?;
        let payload: StartSessionResponse = response.json().await?;

        if !payload.ok {
            return Err(ReportError::RequestFailed(
                payload
                    .error
                    .unwrap_or_else(|| "session start rejected".to_string()),
            ));
        }

        payload
            .session_id
            .map(SessionId::new)
            .ok_or_else(|| ReportError::InvalidResponse("missing session_id".to_string()))
    }

    async fn end_session(&self, session: &SessionId) -> ReportResult<()> {
        self.post_json("/api/session/end", json!({ "session_id": session.as_value() }))
            .await?;
        Ok(())
    }

    async fn submit_sample(
        &self,
        session: &SessionId,
        sample: &EmotionSample,
    ) -> ReportResult<()> {
        self.post_json(
            "/record_emotion",
            json!({
                "session_id": session.as_value(),
                "emotion": sample.label,
                "attention_level": sample.attention_level,
                "confidence": sample.confidence,
            }),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = HttpBackendConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
