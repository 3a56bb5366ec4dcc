//! Periodic removal of expired sessions.
//!
//! Expired sessions are already refused on refresh; this only keeps the store
//! from accumulating rows for users who never come back.

use std::sync::Arc;
use std::time::Duration;

use authgate_core::SessionStore;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop until `cancel` is triggered.
///
/// The first sweep happens immediately.
pub async fn run(store: Arc<dyn SessionStore>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Session sweeper started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                match store.delete_expired(Utc::now()).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Session sweeper: purged expired sessions");
                    }
                    Ok(_) => {
                        tracing::debug!("Session sweeper: nothing to purge");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session sweeper: cleanup failed");
                    }
                }
            }
        }
    }
}
