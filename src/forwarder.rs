//! Ingestion API client
//!
//! Posts matched messages to `<base>/api/signals/ingest` and interprets the
//! tri-state `status` field of the reply. The API does the real parsing and
//! storage; this side only reports whether the message was taken.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const INGEST_PATH: &str = "/api/signals/ingest";
const HEALTH_PATH: &str = "/api/health";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Reasons a forward did not succeed
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned HTTP {0}")]
    HttpStatus(u16),

    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    #[error("API response has no status field")]
    MissingStatus,

    #[error("API status: {0}")]
    UnexpectedStatus(String),
}

/// Result of a single forward attempt
#[derive(Debug)]
pub enum ForwardOutcome {
    /// Accepted and stored; `script` is echoed from the API when present
    Forwarded { script: Option<String> },
    /// The API looked at the message and declined it
    Ignored,
    /// Transport or protocol failure
    Failed(ForwardError),
}

impl ForwardOutcome {
    pub fn is_forwarded(&self) -> bool {
        matches!(self, Self::Forwarded { .. })
    }

    /// Short status label used in command replies
    pub fn label(&self) -> String {
        match self {
            Self::Forwarded { .. } => "success".to_string(),
            Self::Ignored => "ignored".to_string(),
            Self::Failed(e) => e.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct IngestRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct IngestResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    signal: Option<IngestedSignal>,
}

#[derive(Debug, Deserialize)]
struct IngestedSignal {
    #[serde(default)]
    script: Option<String>,
}

/// Downstream health probe result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub http_status: u16,
    pub status: Option<String>,
    pub database: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        (200..300).contains(&self.http_status)
    }
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    database: Option<HealthDatabase>,
}

#[derive(Debug, Deserialize)]
struct HealthDatabase {
    #[serde(default, rename = "connectionString")]
    connection_string: Option<String>,
}

/// Ingestion API client
#[derive(Clone)]
pub struct Forwarder {
    client: Client,
    base_url: String,
    api_key: String,
}

impl Forwarder {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Create from config
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(&config.api_url, &config.ingest_api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn ingest_url(&self) -> String {
        format!("{}{}", self.base_url, INGEST_PATH)
    }

    /// Forward raw message text and log the outcome
    pub async fn forward(&self, message: &str) -> ForwardOutcome {
        let outcome = match self.post_ingest(message).await {
            Ok(outcome) => outcome,
            Err(e) => ForwardOutcome::Failed(e),
        };

        match &outcome {
            ForwardOutcome::Forwarded { script } => {
                info!("Signal forwarded: {}", script.as_deref().unwrap_or("Update"));
            }
            ForwardOutcome::Ignored => info!("Message ignored by API (not a valid signal)"),
            ForwardOutcome::Failed(e) => error!("Failed to forward: {}", e),
        }

        outcome
    }

    async fn post_ingest(&self, message: &str) -> Result<ForwardOutcome, ForwardError> {
        let url = self.ingest_url();
        debug!("POST {} ({} chars)", url, message.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&IngestRequest { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        interpret_ingest_body(&body)
    }

    /// Probe the downstream health endpoint
    pub async fn health(&self) -> Result<HealthReport, ForwardError> {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);

        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;

        let http_status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        // Unhealthy replies often carry HTML or nothing at all
        let parsed: Option<HealthResponse> = serde_json::from_str(&body).ok();
        let (status, database) = match parsed {
            Some(h) => (h.status, h.database.and_then(|d| d.connection_string)),
            None => (None, None),
        };

        Ok(HealthReport {
            http_status,
            status,
            database,
        })
    }
}

/// Map an ingest response body to an outcome
fn interpret_ingest_body(body: &str) -> Result<ForwardOutcome, ForwardError> {
    let parsed: IngestResponse = serde_json::from_str(body)
        .map_err(|e| ForwardError::MalformedResponse(e.to_string()))?;

    match parsed.status.as_deref() {
        Some("success") => Ok(ForwardOutcome::Forwarded {
            script: parsed.signal.and_then(|s| s.script),
        }),
        Some("ignored") => Ok(ForwardOutcome::Ignored),
        Some(other) => Err(ForwardError::UnexpectedStatus(other.to_string())),
        None => Err(ForwardError::MissingStatus),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_script() {
        let outcome =
            interpret_ingest_body(r#"{"status":"success","signal":{"script":"BTCUSD","position":"BUY"}}"#)
                .unwrap();
        match outcome {
            ForwardOutcome::Forwarded { script } => assert_eq!(script.as_deref(), Some("BTCUSD")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_success_without_signal_payload() {
        let outcome = interpret_ingest_body(r#"{"status":"success"}"#).unwrap();
        assert!(outcome.is_forwarded());
    }

    #[test]
    fn test_ignored() {
        let outcome = interpret_ingest_body(r#"{"status":"ignored"}"#).unwrap();
        assert!(matches!(outcome, ForwardOutcome::Ignored));
        assert_eq!(outcome.label(), "ignored");
    }

    #[test]
    fn test_unknown_status_is_failure() {
        let err = interpret_ingest_body(r#"{"status":"error","message":"db down"}"#).unwrap_err();
        assert!(matches!(err, ForwardError::UnexpectedStatus(ref s) if s == "error"));
    }

    #[test]
    fn test_missing_status_is_failure() {
        let err = interpret_ingest_body(r#"{"signal":{"script":"BTCUSD"}}"#).unwrap_err();
        assert!(matches!(err, ForwardError::MissingStatus));
    }

    #[test]
    fn test_non_json_is_failure() {
        let err = interpret_ingest_body("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ForwardError::MalformedResponse(_)));
    }

    #[test]
    fn test_urls_tolerate_trailing_slash() {
        let forwarder = Forwarder::new("https://signals.example.com/", "key");
        assert_eq!(forwarder.base_url(), "https://signals.example.com");
        assert_eq!(
            forwarder.ingest_url(),
            "https://signals.example.com/api/signals/ingest"
        );
    }

    #[test]
    fn test_unreachable_endpoint_reports_failure() {
        // Port 1 on loopback refuses connections
        let forwarder = Forwarder::new("http://127.0.0.1:1", "key");
        let outcome = tokio_test::block_on(forwarder.forward("Hit SL From Long Signal"));
        assert!(matches!(outcome, ForwardOutcome::Failed(ForwardError::Transport(_))));
    }

    #[test]
    fn test_invalid_base_url_fails_at_call_time() {
        let forwarder = Forwarder::new("not a url", "key");
        let outcome = tokio_test::block_on(forwarder.forward("anything"));
        assert!(matches!(outcome, ForwardOutcome::Failed(_)));
    }
}
