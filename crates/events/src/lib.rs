//! Outbound security alerts.
//!
//! - [`delivery::webhook`] -- a single JSON POST to the configured sink.
//! - [`WebhookNotifier`] -- the [`authgate_core::SecurityNotifier`] that queues
//!   alerts for a background delivery task so the refresh path never waits.

pub mod delivery;
pub mod notifier;

pub use delivery::webhook::{WebhookDelivery, WebhookError};
pub use notifier::WebhookNotifier;
