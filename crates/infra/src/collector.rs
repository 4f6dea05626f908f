//! Collector client for remote telemetry delivery
//!
//! One HTTP POST per flush batch: the JSON body carries the batch, the
//! session identifier, and a send timestamp. Any 2xx response acknowledges
//! the batch; the response body is ignored. Everything else is a delivery
//! failure surfaced as a [`TransportError`] for the flush path to absorb.

use std::time::Duration;

use async_trait::async_trait;
use beacon_core::ports::{ErrorTransport, LogTransport};
use beacon_domain::{ErrorBatch, LogBatch, Result};
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::errors::TransportError;
use crate::http::HttpClient;

/// Configuration for the collector client
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Full URL the batches are POSTed to
    pub endpoint: String,
    /// Timeout for one delivery attempt
    pub timeout: Duration,
    /// Transport-level attempts per delivery; the pipeline's own retry is
    /// requeue-driven, so this defaults to a single attempt
    pub max_attempts: usize,
    /// User-agent header sent with every request
    pub user_agent: Option<String>,
}

impl CollectorConfig {
    /// Configuration for the given endpoint with default timeouts
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(10),
            max_attempts: 1,
            user_agent: None,
        }
    }
}

/// HTTP client for the remote telemetry collector
pub struct CollectorClient {
    http_client: HttpClient,
    config: CollectorConfig,
}

impl CollectorClient {
    /// Create a collector client
    pub fn new(config: CollectorConfig) -> std::result::Result<Self, TransportError> {
        let mut builder =
            HttpClient::builder().timeout(config.timeout).max_attempts(config.max_attempts);

        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        Ok(Self { http_client: builder.build()?, config })
    }

    /// The configured collector endpoint
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    async fn post_batch<T: Serialize + Sync>(
        &self,
        payload: &T,
        kind: &'static str,
    ) -> std::result::Result<(), TransportError> {
        let request =
            self.http_client.request(Method::POST, &self.config.endpoint).json(payload);

        let response = self.http_client.send(request).await?;
        let status = response.status();

        if status.is_success() {
            debug!(kind, %status, "collector acknowledged batch");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportError::from_status(status.as_u16(), body))
    }
}

#[async_trait]
impl LogTransport for CollectorClient {
    #[instrument(skip(self, batch), fields(count = batch.events.len()))]
    async fn deliver(&self, batch: &LogBatch) -> Result<()> {
        self.post_batch(batch, "logs").await.map_err(Into::into)
    }
}

#[async_trait]
impl ErrorTransport for CollectorClient {
    #[instrument(skip(self, batch), fields(count = batch.errors.len()))]
    async fn deliver(&self, batch: &ErrorBatch) -> Result<()> {
        self.post_batch(batch, "errors").await.map_err(Into::into)
    }
}
