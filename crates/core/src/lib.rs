//! Authgate core: access-token signing, refresh-secret handling, session
//! storage contracts, and the refresh-token rotation protocol.
//!
//! - [`token`] -- HS256 access-token issue/parse ([`TokenCodec`]).
//! - [`refresh`] -- random refresh secrets and their Argon2id hashes.
//! - [`session`] -- the session model, the [`SessionStore`] trait, and an
//!   in-memory store.
//! - [`notify`] -- fire-and-forget security alerts.
//! - [`rotation`] -- [`RotationEngine`], the issue/refresh/logout protocol.

pub mod error;
pub mod notify;
pub mod refresh;
pub mod rotation;
pub mod session;
pub mod token;
pub mod types;

pub use error::{CoreError, UnauthorizedReason};
pub use notify::{SecurityAlert, SecurityNotifier};
pub use refresh::RefreshSecretManager;
pub use rotation::{RotationEngine, RotationSettings, TokenPair};
pub use session::{MemorySessionStore, NewSession, Session, SessionStore, StoreError};
pub use token::TokenCodec;
