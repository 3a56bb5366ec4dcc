//! Queue-backed [`SecurityNotifier`].
//!
//! [`WebhookNotifier::notify`] only pushes onto a bounded channel. A separate
//! task drains the channel and posts each alert through [`WebhookDelivery`].
//! When the queue is full the alert is dropped and logged; the caller is never
//! slowed down or failed by the sink.

use authgate_core::{SecurityAlert, SecurityNotifier};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::delivery::webhook::{WebhookDelivery, WebhookError};

/// Default number of alerts buffered ahead of the delivery task.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    sender: mpsc::Sender<SecurityAlert>,
}

impl WebhookNotifier {
    /// Start the delivery task for `url` and return the notifier feeding it.
    ///
    /// The task exits once every clone of the notifier has been dropped and
    /// the queue is drained.
    pub fn spawn(url: impl Into<String>) -> Result<(Self, JoinHandle<()>), WebhookError> {
        Self::spawn_with_capacity(url, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn spawn_with_capacity(
        url: impl Into<String>,
        capacity: usize,
    ) -> Result<(Self, JoinHandle<()>), WebhookError> {
        let delivery = WebhookDelivery::new()?;
        let (sender, receiver) = mpsc::channel(capacity);
        let handle = tokio::spawn(run(delivery, url.into(), receiver));
        Ok((Self { sender }, handle))
    }
}

impl SecurityNotifier for WebhookNotifier {
    fn notify(&self, alert: SecurityAlert) {
        if let Err(e) = self.sender.try_send(alert) {
            let alert = match e {
                mpsc::error::TrySendError::Full(alert) => alert,
                mpsc::error::TrySendError::Closed(alert) => alert,
            };
            tracing::warn!(
                user_id = %alert.user_id,
                event = %alert.event,
                "Security alert dropped: delivery queue unavailable"
            );
        }
    }
}

/// Drain `receiver`, posting each alert to `url` once.
async fn run(delivery: WebhookDelivery, url: String, mut receiver: mpsc::Receiver<SecurityAlert>) {
    tracing::info!(url = %url, "Security alert delivery started");

    while let Some(alert) = receiver.recv().await {
        match delivery.deliver(&url, &alert).await {
            Ok(()) => {
                tracing::debug!(
                    user_id = %alert.user_id,
                    event = %alert.event,
                    "Security alert delivered"
                );
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %alert.user_id,
                    event = %alert.event,
                    error = %e,
                    "Security alert delivery failed"
                );
            }
        }
    }

    tracing::info!("Security alert delivery stopped");
}
