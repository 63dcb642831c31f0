use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, error};

use crate::message::NotificationMessage;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Request never got a response
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Webhook answered with a non-success status
    #[error("Webhook responded {status} {status_text}")]
    Rejected {
        status: u16,
        status_text: String,
        body: Option<String>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Destination for a built notification. Each call is a single attempt.
#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, message: &NotificationMessage) -> Result<(), DeliveryError>;
}

/// Posts the message to its webhook URL and waits for the server to confirm.
pub struct WebhookSink {
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for WebhookSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, message: &NotificationMessage) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&message.destination_url)
            .query(&[("wait", "true")])
            .header(CONTENT_TYPE, "application/json")
            .json(&message.payload)
            .send()
            .await
            .map_err(|err| {
                // reqwest errors carry the URL; strip it so the token stays out of logs.
                let err = err.without_url();
                error!(error = ?err, "Webhook request failed");
                DeliveryError::Transport(err)
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Webhook accepted message");
            return Ok(());
        }

        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.text().await.ok().filter(|b| !b.is_empty());
        error!(
            status = status.as_u16(),
            status_text = %status_text,
            body = body.as_deref().unwrap_or("<empty>"),
            "Webhook rejected message"
        );
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

/// Writes the payload to stdout instead of sending it.
pub struct StdoutSink;

#[async_trait]
impl Sink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn deliver(&self, message: &NotificationMessage) -> Result<(), DeliveryError> {
        println!("{}", serde_json::to_string_pretty(&message.payload)?);
        Ok(())
    }
}
