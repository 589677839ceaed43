use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::core::error::{ReportError, ReportResult};
use crate::core::models::message::ChatMessage;
use crate::core::services::MessageSink;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts chat messages to a Slack-compatible incoming webhook.
pub struct SlackWebhook {
    client: reqwest::Client,
}

impl SlackWebhook {
    pub fn new() -> ReportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ReportError::Delivery(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

/// Validate a webhook URL before anything is sent to it.
///
/// The URL comes out of the parameter store, so a typo there must not leak
/// the report over plain HTTP. Loopback hosts may use `http` for local relays.
pub fn validate_webhook_url(raw: &str) -> ReportResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ReportError::Delivery(format!("invalid webhook URL: {}", e)))?;
    match url.scheme() {
        "https" => Ok(url),
        "http" if is_loopback(&url) => Ok(url),
        scheme => Err(ReportError::Delivery(format!(
            "webhook URL must use HTTPS, got scheme '{}'",
            scheme
        ))),
    }
}

fn is_loopback(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
}

/// Describe a transport failure without the request URL. The webhook URL
/// carries the token, so it must not reach stderr or the logs.
fn transport_error(e: reqwest::Error) -> String {
    let kind = if e.is_timeout() {
        "timed out"
    } else if e.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    format!("webhook {}: {}", kind, e.without_url())
}

#[async_trait]
impl MessageSink for SlackWebhook {
    async fn post(&self, webhook_url: &str, message: &ChatMessage) -> ReportResult<()> {
        let url = validate_webhook_url(webhook_url)?;

        let response = self
            .client
            .post(url)
            .json(message)
            .send()
            .await
            .map_err(|e| ReportError::Delivery(transport_error(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "webhook rejected message");
            return Err(ReportError::Delivery(format!(
                "HTTP {} from webhook: {}",
                status.as_u16(),
                body
            )));
        }

        tracing::info!(status = status.as_u16(), "message delivered");
        Ok(())
    }
}
