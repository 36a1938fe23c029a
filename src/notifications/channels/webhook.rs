//! Webhook notification channel
//!
//! Posts each message as `{"text": "<message>"}`, the payload shape accepted
//! by Slack/Mattermost style incoming hooks and most chat bridges.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Channel, ChannelError, ChannelResult, DeliveryStatus};
use crate::config::PublisherConfig;

/// Webhook channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URL endpoint
    pub url: String,
    /// Optional authentication token (sent as Bearer token)
    pub auth_token: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    10
}

impl WebhookConfig {
    /// Create a new webhook configuration
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            timeout_secs: default_timeout(),
        }
    }

    /// Webhook settings from the publisher section, if an endpoint is configured
    pub fn from_publisher(config: &PublisherConfig) -> Option<Self> {
        let url = config.webhook_url.as_ref()?;
        Some(Self {
            url: url.clone(),
            auth_token: config.auth_token.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Set authentication token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Webhook URL cannot be empty".to_string());
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("Webhook URL must start with http:// or https://".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Webhook notification channel
///
/// # Example
///
/// ```rust,ignore
/// use sitewatch::notifications::channels::webhook::{WebhookChannel, WebhookConfig};
///
/// let config = WebhookConfig::new("https://hooks.example.com/sitewatch")
///     .with_auth_token("secret-token")
///     .with_timeout(15);
///
/// let channel = WebhookChannel::new(config)?;
/// channel.send("New job: Propulsion Engineer https://spacex.com/careers/position/1").await?;
/// ```
pub struct WebhookChannel {
    config: WebhookConfig,
    client: Client,
}

impl WebhookChannel {
    /// Create a new webhook channel
    pub fn new(config: WebhookConfig) -> ChannelResult<Self> {
        config.validate().map_err(ChannelError::InvalidConfig)?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ChannelError::Other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn build_payload(message: &str) -> serde_json::Value {
        serde_json::json!({ "text": message })
    }
}

#[async_trait]
impl Channel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, message: &str) -> ChannelResult<DeliveryStatus> {
        let mut request = self.client.post(&self.config.url);

        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.json(&Self::build_payload(message)).send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::debug!(url = %self.config.url, %status, "Webhook delivered");
            return Ok(DeliveryStatus::success_with_message(
                "webhook",
                format!("Delivered to {}", self.config.url),
            ));
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());
        let detail = format!("HTTP {status}: {body}");

        Err(if status == StatusCode::TOO_MANY_REQUESTS {
            ChannelError::RateLimited(detail)
        } else if status.is_server_error() {
            ChannelError::Unavailable(detail)
        } else {
            ChannelError::Other(detail)
        })
    }
}
