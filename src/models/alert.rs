use serde::{Deserialize, Serialize};

use super::market::Stock;

/// Trigger direction for a price alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertCondition {
    Above,
    Below,
}

impl std::fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertCondition::Above => write!(f, "Above"),
            AlertCondition::Below => write!(f, "Below"),
        }
    }
}

/// A price alert owned by the current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub stock_id: i64,
    pub target_price: f64,
    pub condition: AlertCondition,
    pub is_active: bool,
    pub stock: Stock,
}

/// Payload for `POST /alerts/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAlert {
    pub stock_id: i64,
    pub target_price: f64,
    pub condition: AlertCondition,
}
