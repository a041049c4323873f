//! Typed client for the Stock Manager REST API.
//!
//! This module provides the `ApiClient` facade over [`SessionContext`]:
//! sign-in and sign-out, plus one method per server endpoint for market
//! data, portfolio records, the watchlist, and price alerts. Every call
//! flows through the session's pipeline, so token stamping and renewal
//! happen the same way regardless of which endpoint is hit.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::auth::SessionContext;
use crate::config::Config;
use crate::models::{
    Alert, NewAlert, NewTransaction, PortfolioItem, StockDetail, Transaction, WatchlistItem,
};

use super::error::ApiError;
use super::request::RequestDescriptor;

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    message: String,
}

/// Everything the portfolio screens need, fetched in one go.
#[derive(Debug, Clone)]
pub struct Overview {
    pub holdings: Vec<PortfolioItem>,
    pub watchlist: Vec<WatchlistItem>,
    pub alerts: Vec<Alert>,
}

/// API client for the Stock Manager server.
/// Clone is cheap and clones share the session.
#[derive(Clone)]
pub struct ApiClient {
    session: SessionContext,
}

impl ApiClient {
    /// Create a client with its own session stack.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            session: SessionContext::new(config)?,
        })
    }

    /// Create a client over an existing session.
    pub fn with_session(session: SessionContext) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    // ===== Authentication =====

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.session.login(username, password).await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<(), ApiError> {
        self.session.register(email, password).await
    }

    pub async fn logout(&self) {
        self.session.logout().await
    }

    // ===== Market =====

    /// Fetch all listed stocks with their latest snapshots.
    pub async fn fetch_stocks(&self) -> Result<Vec<StockDetail>, ApiError> {
        self.session
            .execute_json(&RequestDescriptor::get("/market/stocks"))
            .await
    }

    /// Fetch a single stock by trading code.
    pub async fn fetch_stock(&self, trading_code: &str) -> Result<StockDetail, ApiError> {
        let descriptor = RequestDescriptor::get(format!("/market/stocks/{}", trading_code));
        self.session.execute_json(&descriptor).await
    }

    /// Kick off a market data scrape on the server. Returns the server's
    /// acknowledgement message; the scrape itself runs in the background.
    pub async fn trigger_scrape(&self) -> Result<String, ApiError> {
        let response: ScrapeResponse = self
            .session
            .execute_json(&RequestDescriptor::get("/market/scrape"))
            .await?;
        Ok(response.message)
    }

    // ===== Portfolio =====

    /// Fetch recorded transactions, newest window first per the server's
    /// paging (`skip`/`limit`).
    pub async fn fetch_transactions(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Transaction>, ApiError> {
        let descriptor = RequestDescriptor::get("/portfolio/transactions")
            .query("skip", skip)
            .query("limit", limit);
        self.session.execute_json(&descriptor).await
    }

    /// Record a buy or sell.
    pub async fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<Transaction, ApiError> {
        let descriptor =
            RequestDescriptor::post("/portfolio/transactions").json(serde_json::to_value(transaction)?);
        self.session.execute_json(&descriptor).await
    }

    /// Fetch current holdings, aggregated server-side from transactions.
    pub async fn fetch_holdings(&self) -> Result<Vec<PortfolioItem>, ApiError> {
        self.session
            .execute_json(&RequestDescriptor::get("/portfolio/holdings"))
            .await
    }

    pub async fn fetch_watchlist(&self) -> Result<Vec<WatchlistItem>, ApiError> {
        self.session
            .execute_json(&RequestDescriptor::get("/portfolio/watchlist"))
            .await
    }

    pub async fn add_to_watchlist(&self, stock_id: i64) -> Result<WatchlistItem, ApiError> {
        let descriptor =
            RequestDescriptor::post("/portfolio/watchlist").json(json!({ "stock_id": stock_id }));
        self.session.execute_json(&descriptor).await
    }

    // ===== Alerts =====

    pub async fn fetch_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.session
            .execute_json(&RequestDescriptor::get("/alerts/"))
            .await
    }

    pub async fn create_alert(&self, alert: &NewAlert) -> Result<Alert, ApiError> {
        let descriptor = RequestDescriptor::post("/alerts/").json(serde_json::to_value(alert)?);
        self.session.execute_json(&descriptor).await
    }

    /// Delete an alert. The server answers 204 with no body.
    pub async fn delete_alert(&self, alert_id: i64) -> Result<(), ApiError> {
        let descriptor = RequestDescriptor::delete(format!("/alerts/{}", alert_id));
        self.session.execute(&descriptor).await?;
        Ok(())
    }

    // ===== Aggregates =====

    /// Fetch holdings, watchlist, and alerts in parallel.
    ///
    /// If the token has expired, all three discover it together and share
    /// a single renewal.
    pub async fn fetch_overview(&self) -> Result<Overview, ApiError> {
        let (holdings, watchlist, alerts) = futures::try_join!(
            self.fetch_holdings(),
            self.fetch_watchlist(),
            self.fetch_alerts(),
        )?;

        Ok(Overview {
            holdings,
            watchlist,
            alerts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scrape_response() {
        let json = r#"{"message": "Scraping started in background"}"#;
        let resp: ScrapeResponse =
            serde_json::from_str(json).expect("Failed to parse scrape test JSON");
        assert_eq!(resp.message, "Scraping started in background");
    }
}
