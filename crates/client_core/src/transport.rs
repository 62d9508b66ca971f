//! Network seam between the controller and the explanation service.
//!
//! A transport only moves bytes: it returns the raw response body and leaves
//! shape validation to [`decode_topic_result`].

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{TopicRequest, TopicResult, EXPLAIN_TOPIC_PATH};
use tracing::debug;
use url::Url;

use crate::error::{DecodeError, TransportError};

#[async_trait]
pub trait TopicTransport: Send + Sync {
    /// Sends `topic` to the service and returns the body of a 2xx response.
    async fn explain_topic(&self, topic: &str) -> Result<String, TransportError>;
}

/// Validating decode step for an `explain-topic` response body.
pub fn decode_topic_result(body: &str) -> Result<TopicResult, DecodeError> {
    if body.trim().is_empty() {
        return Err(DecodeError::EmptyBody);
    }
    Ok(serde_json::from_str(body)?)
}

/// Resolves `explain-topic` against `base_url`, treating the base as a
/// directory even when it lacks a trailing slash.
pub fn explain_topic_endpoint(base_url: &str) -> Result<Url, TransportError> {
    let raw = base_url.trim();
    let invalid = |source: url::ParseError| TransportError::InvalidUrl {
        url: raw.to_string(),
        source,
    };
    let mut base = Url::parse(raw).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(EXPLAIN_TOPIC_PATH).map_err(invalid)
}

pub struct HttpTransport {
    http: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            http,
            endpoint: explain_topic_endpoint(base_url)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TopicTransport for HttpTransport {
    async fn explain_topic(&self, topic: &str) -> Result<String, TransportError> {
        debug!(endpoint = %self.endpoint, topic_len = topic.len(), "posting topic");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&TopicRequest::new(topic))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
