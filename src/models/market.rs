use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A listed stock as returned by the market endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub id: i64,
    /// Exchange trading code, e.g. "GP".
    pub trading_code: String,
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
    /// Server-side timestamp of the last data import (naive UTC).
    pub last_updated: NaiveDateTime,
}

/// Latest market snapshot for a stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    /// Last traded price.
    pub ltp: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Yesterday's closing price.
    pub ycp: f64,
    pub change: f64,
    pub trade: f64,
    pub value: f64,
    pub volume: f64,
    pub updated_at: NaiveDateTime,
}

/// Stock with its market snapshot embedded, as served by
/// `GET /market/stocks` and `GET /market/stocks/{trading_code}`.
///
/// The server flattens the stock fields at the top level and nests
/// `market_data`, which is null until the first scrape has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDetail {
    #[serde(flatten)]
    pub stock: Stock,
    #[serde(default)]
    pub market_data: Option<MarketData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_detail_parses_with_market_data() {
        let json = r#"{
            "id": 1,
            "trading_code": "GP",
            "name": "Grameenphone Ltd.",
            "sector": "Telecommunication",
            "last_updated": "2026-02-14T09:30:00",
            "market_data": {
                "ltp": 285.5, "high": 288.0, "low": 283.1, "close": 285.5,
                "ycp": 284.0, "change": 1.5, "trade": 1520.0, "value": 43.2,
                "volume": 151000.0, "updated_at": "2026-02-14T09:30:00"
            }
        }"#;

        let detail: StockDetail = serde_json::from_str(json).expect("parse stock detail");
        assert_eq!(detail.stock.trading_code, "GP");
        assert_eq!(detail.stock.sector.as_deref(), Some("Telecommunication"));
        let market = detail.market_data.expect("market data present");
        assert_eq!(market.ltp, 285.5);
        assert_eq!(market.ycp, 284.0);
    }

    #[test]
    fn test_stock_detail_parses_without_market_data() {
        let json = r#"{
            "id": 7,
            "trading_code": "NEWIPO",
            "name": "Fresh Listing",
            "sector": null,
            "last_updated": "2026-02-14T09:30:00"
        }"#;

        let detail: StockDetail = serde_json::from_str(json).expect("parse stock detail");
        assert!(detail.stock.sector.is_none());
        assert!(detail.market_data.is_none());
    }
}
