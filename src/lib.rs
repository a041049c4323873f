//! # stockman-client -- Rust client for the Stock Manager API
//!
//! Typed access to a Stock Manager server: market listings and snapshots,
//! portfolio transactions and holdings, watchlist, and price alerts.
//!
//! The interesting part is the authenticated-request pipeline. Every call
//! carries the current bearer token; when the server answers 401 the
//! client renews the session through the HttpOnly refresh cookie and
//! resends the request once, invisibly to the caller. Any number of
//! concurrent requests hitting the same expired token share a single
//! renewal call.
//!
//! ```no_run
//! use stockman_client::{ApiClient, Config};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = ApiClient::new(&Config::load()?)?;
//! client.login("user@example.com", "secret").await?;
//! let stocks = client.fetch_stocks().await?;
//! println!("{} stocks listed", stocks.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, Overview};
pub use auth::SessionContext;
pub use config::Config;
