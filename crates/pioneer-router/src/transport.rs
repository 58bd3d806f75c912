//! Collector protocol client.
//!
//! Two read-only requests at startup (`GET version`, `GET config`) and one
//! `POST export` per published event. The export path sits behind the
//! [`ExportTransport`] trait so the publisher and controller can be tested
//! against an in-memory transport.

use async_trait::async_trait;

use pioneer_core::{Config, EventEnvelope};

use crate::error::{ConfigFetchError, TransportError};

/// Opaque collector acknowledgement of one export.
///
/// The body is logged, never parsed for control flow.
#[derive(Debug, Clone)]
pub struct ExportAck {
    pub body: String,
}

/// Delivery seam between the publisher and the collector.
#[async_trait]
pub trait ExportTransport: Send + Sync {
    /// Deliver one envelope as a single request and await acknowledgement.
    ///
    /// Implementations must not retry; at-most-once semantics per event are
    /// part of the publishing contract.
    async fn export(&self, envelope: &EventEnvelope) -> Result<ExportAck, TransportError>;
}

/// HTTP implementation of the collector protocol.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a client for the collector at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Fetch the collector's version string.
    pub async fn fetch_version(&self) -> Result<String, ConfigFetchError> {
        let response = self.client.get(self.endpoint("version")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConfigFetchError::Status {
                endpoint: "version".to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        Ok(decode_version(&body))
    }

    /// Fetch the engine configuration.
    ///
    /// Failure here is fatal: activation aborts rather than running with a
    /// partial configuration.
    pub async fn fetch_config(&self) -> Result<Config, ConfigFetchError> {
        let response = self.client.get(self.endpoint("config")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConfigFetchError::Status {
                endpoint: "config".to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ConfigFetchError::Decode)
    }
}

/// Collectors answer `GET version` with either a bare string or a
/// JSON-encoded one; accept both.
fn decode_version(body: &str) -> String {
    serde_json::from_str::<String>(body).unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl ExportTransport for HttpTransport {
    async fn export(&self, envelope: &EventEnvelope) -> Result<ExportAck, TransportError> {
        let response = self
            .client
            .post(self.endpoint("export"))
            .json(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(ExportAck { body })
    }
}
