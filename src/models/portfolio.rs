use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::market::{Stock, StockDetail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "Buy"),
            TransactionType::Sell => write!(f, "Sell"),
        }
    }
}

/// A recorded buy or sell, as returned by `GET /portfolio/transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub stock_id: i64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub quantity: f64,
    pub price: f64,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub stock: Option<Stock>,
}

impl Transaction {
    /// Total value of the transaction at its recorded price.
    pub fn total(&self) -> f64 {
        self.quantity * self.price
    }
}

/// Payload for `POST /portfolio/transactions`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTransaction {
    pub stock_id: i64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub quantity: f64,
    pub price: f64,
}

/// One aggregated position from `GET /portfolio/holdings`.
///
/// The server computes these from the transaction history; quantities
/// are net of sells and `average_cost` reflects total buy cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub stock: Stock,
    pub quantity: f64,
    pub average_cost: f64,
    pub current_value: f64,
    pub gain_loss: f64,
    pub gain_loss_percent: f64,
}

impl PortfolioItem {
    pub fn is_gain(&self) -> bool {
        self.gain_loss >= 0.0
    }
}

/// A watchlist entry, with the tracked stock and its latest snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub id: i64,
    pub stock_id: i64,
    pub stock: StockDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Buy).unwrap(),
            "\"BUY\""
        );
        let parsed: TransactionType = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(parsed, TransactionType::Sell);
    }

    #[test]
    fn test_transaction_parses_server_response() {
        let json = r#"{
            "id": 3,
            "stock_id": 1,
            "type": "BUY",
            "quantity": 100.0,
            "price": 285.5,
            "date": "2026-02-10T11:05:00",
            "stock": {
                "id": 1,
                "trading_code": "GP",
                "name": "Grameenphone Ltd.",
                "sector": "Telecommunication",
                "last_updated": "2026-02-14T09:30:00"
            }
        }"#;

        let tx: Transaction = serde_json::from_str(json).expect("parse transaction");
        assert_eq!(tx.transaction_type, TransactionType::Buy);
        assert_eq!(tx.total(), 28550.0);
        assert_eq!(tx.stock.as_ref().map(|s| s.trading_code.as_str()), Some("GP"));
    }

    #[test]
    fn test_new_transaction_serializes_type_field() {
        let payload = NewTransaction {
            stock_id: 1,
            transaction_type: TransactionType::Sell,
            quantity: 50.0,
            price: 290.0,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "SELL");
        assert_eq!(value["stock_id"], 1);
    }

    #[test]
    fn test_portfolio_item_gain_direction() {
        let json = r#"{
            "stock": {
                "id": 1, "trading_code": "GP", "name": "Grameenphone Ltd.",
                "sector": null, "last_updated": "2026-02-14T09:30:00"
            },
            "quantity": 100.0,
            "average_cost": 280.0,
            "current_value": 28550.0,
            "gain_loss": 550.0,
            "gain_loss_percent": 1.96
        }"#;

        let item: PortfolioItem = serde_json::from_str(json).expect("parse holding");
        assert!(item.is_gain());
        assert_eq!(item.quantity, 100.0);
    }
}
