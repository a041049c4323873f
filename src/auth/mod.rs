//! Authentication module: session lifecycle and token renewal.
//!
//! This module provides:
//! - `SessionContext`: login/register/logout and the execute path
//! - `TokenStore`: the shared, optionally persisted access token slot
//! - `RefreshCoordinator`: single-flight renewal of an expired token
//!
//! The refresh credential is an HttpOnly cookie owned by the HTTP
//! client's cookie store; nothing in this module reads or writes it.

pub mod refresh;
pub mod session;
pub mod token_store;

pub use refresh::{RefreshCoordinator, RefreshOutcome};
pub use session::SessionContext;
pub use token_store::TokenStore;
