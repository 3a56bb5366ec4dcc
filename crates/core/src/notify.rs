//! Security alerts raised during refresh.
//!
//! Alerts are fire-and-forget: [`SecurityNotifier::notify`] must return
//! immediately and never report delivery back to the refresh path.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Event name sent when a session is refreshed from a different address.
pub const REFRESH_FROM_NEW_IP: &str = "refresh_from_new_ip";

/// Body posted to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub user_id: UserId,
    pub old_ip: String,
    pub new_ip: String,
    pub user_agent: String,
    pub event: String,
}

impl SecurityAlert {
    pub fn ip_changed(
        user_id: UserId,
        old_ip: impl Into<String>,
        new_ip: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            old_ip: old_ip.into(),
            new_ip: new_ip.into(),
            user_agent: user_agent.into(),
            event: REFRESH_FROM_NEW_IP.to_string(),
        }
    }
}

pub trait SecurityNotifier: Send + Sync {
    /// Hand off an alert. Must not block and must not fail the caller.
    fn notify(&self, alert: SecurityAlert);
}

/// Notifier for deployments without a sink: the alert only reaches the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyNotifier;

impl SecurityNotifier for LogOnlyNotifier {
    fn notify(&self, alert: SecurityAlert) {
        tracing::warn!(
            user_id = %alert.user_id,
            old_ip = %alert.old_ip,
            new_ip = %alert.new_ip,
            event = %alert.event,
            "Security alert (no webhook configured)"
        );
    }
}
