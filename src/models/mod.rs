pub mod session;
pub mod strategy;
pub mod trade;

pub use session::{AuthUser, Session};
pub use strategy::{NewStrategy, Strategy, StrategyRow};
pub use trade::{ConfluenceTrade, NewTrade, Trade, TradeUpdate};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(alias = "BUY", alias = "buy", alias = "LONG", alias = "Long", alias = "long")]
    Buy,
    #[serde(alias = "SELL", alias = "sell", alias = "SHORT", alias = "Short", alias = "short")]
    Sell,
}

impl Side {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BUY" | "LONG" => Some(Side::Buy),
            "SELL" | "SHORT" => Some(Side::Sell),
            _ => None,
        }
    }

    /// Column value stored in `trades.side`.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}
