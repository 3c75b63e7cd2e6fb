//! Outbound report delivery
//!
//! Sinks accept an already formatted JSON payload. Delivery failures are
//! logged and not retried.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::{Result, TrendwatchError};

/// Destination for finished reports
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Deliver one payload
    async fn send(&self, payload: &Value) -> Result<()>;

    /// Sink name for logs
    fn name(&self) -> &str;
}

/// Posts payloads to an incoming-webhook URL
#[derive(Clone)]
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TrendwatchError::sink(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ReportSink for WebhookSink {
    async fn send(&self, payload: &Value) -> Result<()> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrendwatchError::sink(format!(
                "Webhook returned HTTP {}: {}",
                status, body
            )));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

/// Prints payloads instead of sending them
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

#[async_trait]
impl ReportSink for StdoutSink {
    async fn send(&self, payload: &Value) -> Result<()> {
        match payload.get("text").and_then(Value::as_str) {
            Some(text) => println!("{}", text),
            None => println!("{}", serde_json::to_string_pretty(payload)?),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}

/// Send once; a failure is logged and reported as `false`
pub async fn deliver(sink: &dyn ReportSink, payload: &Value) -> bool {
    match sink.send(payload).await {
        Ok(()) => {
            info!(sink = sink.name(), "Report delivered");
            true
        }
        Err(e) => {
            warn!(sink = sink.name(), error = %e, "Report delivery failed");
            false
        }
    }
}
