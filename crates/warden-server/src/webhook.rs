//! Address-change webhook delivery.
//!
//! A single background task drains the notifier channel and POSTs each
//! event. Failures are logged and dropped; nothing is retried.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use warden_auth::{AddressChange, ChannelNotifier};

use crate::config::NotifierConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook responded with {0}")]
    Status(StatusCode),
}

#[derive(Debug, Serialize)]
struct AddressChangePayload<'a> {
    user_guid: Uuid,
    new_ip: &'a str,
}

pub struct WebhookDispatcher {
    client: reqwest::Client,
    endpoint: String,
    rx: mpsc::Receiver<AddressChange>,
}

impl WebhookDispatcher {
    /// Start the delivery task and return the notifier feeding it.
    ///
    /// Without an endpoint no task is spawned and the notifier discards
    /// every event.
    pub fn spawn(config: &NotifierConfig) -> Result<ChannelNotifier, NotifyError> {
        let Some(endpoint) = config
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
        else {
            info!("No webhook configured, address change notifications disabled");
            return Ok(ChannelNotifier::disabled());
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let (notifier, rx) = ChannelNotifier::channel(config.queue_capacity);

        let dispatcher = Self {
            client,
            endpoint: endpoint.to_string(),
            rx,
        };
        tokio::spawn(dispatcher.run());

        Ok(notifier)
    }

    async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            match self.deliver(&event).await {
                Ok(()) => debug!(user_id = %event.user_id, "Address change delivered"),
                Err(e) => warn!(
                    user_id = %event.user_id,
                    error = %e,
                    "Address change webhook failed"
                ),
            }
        }
        debug!("Webhook dispatcher stopped");
    }

    async fn deliver(&self, event: &AddressChange) -> Result<(), NotifyError> {
        let payload = AddressChangePayload {
            user_guid: event.user_id,
            new_ip: &event.new_ip,
        };

        let resp = self.client.post(&self.endpoint).json(&payload).send().await?;
        if !resp.status().is_success() {
            return Err(NotifyError::Status(resp.status()));
        }
        Ok(())
    }
}
