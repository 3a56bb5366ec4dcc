//! Request handlers.
//!
//! Handlers pull caller metadata through the extractors in
//! [`crate::middleware`], delegate to the [`RotationEngine`] held in
//! [`AppState`], and map failures via [`AppError`].
//!
//! [`RotationEngine`]: authgate_core::RotationEngine
//! [`AppState`]: crate::state::AppState
//! [`AppError`]: crate::error::AppError

pub mod auth;
