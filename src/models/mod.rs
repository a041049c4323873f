//! Data models for Stock Manager entities.
//!
//! This module contains the wire-format structures exchanged with the
//! Stock Manager API:
//!
//! - `Stock`, `MarketData`, `StockDetail`: market listings and snapshots
//! - `Transaction`, `PortfolioItem`, `WatchlistItem`: portfolio records
//! - `Alert`: price alerts with trigger conditions
//!
//! Timestamps are `NaiveDateTime` because the server emits offset-less
//! ISO 8601 strings.

pub mod alert;
pub mod market;
pub mod portfolio;

pub use alert::{Alert, AlertCondition, NewAlert};
pub use market::{MarketData, Stock, StockDetail};
pub use portfolio::{NewTransaction, PortfolioItem, Transaction, TransactionType, WatchlistItem};
