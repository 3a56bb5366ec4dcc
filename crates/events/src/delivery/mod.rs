//! External delivery channels for security alerts.

pub mod webhook;
