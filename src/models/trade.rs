use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Side;

/// Database row for the trades table.
///
/// `pnl` is stored independently of the prices and may be absent; consumers
/// go through [`Trade::pnl_or_zero`] instead of unwrapping it themselves.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trade {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub side: String,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub trade_date: NaiveDate,
    pub strategy_id: Option<Uuid>,
    pub emotional_state: Vec<String>,
    pub market: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trade {
    pub fn pnl_or_zero(&self) -> Decimal {
        self.pnl.unwrap_or(Decimal::ZERO)
    }

    pub fn side(&self) -> Option<Side> {
        Side::from_api_str(&self.side)
    }
}

/// Trade row joined with the name of its strategy, if the strategy still exists.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConfluenceTrade {
    pub id: Uuid,
    pub symbol: String,
    pub side: String,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub trade_date: NaiveDate,
    pub strategy_id: Option<Uuid>,
    pub strategy_name: Option<String>,
    pub emotional_state: Vec<String>,
    pub market: Option<String>,
}

/// Body of a trade submission.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrade {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub trade_date: NaiveDate,
    pub strategy_id: Option<Uuid>,
    #[serde(default)]
    pub emotional_state: Vec<String>,
    pub market: Option<String>,
    pub notes: Option<String>,
}

impl NewTrade {
    /// Reject submissions the journal cannot store meaningfully.
    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.trim().is_empty() {
            return Err("symbol must not be empty".into());
        }
        if self.quantity <= Decimal::ZERO {
            return Err("quantity must be positive".into());
        }
        if self.entry_price < Decimal::ZERO {
            return Err("entry_price must not be negative".into());
        }
        if matches!(self.exit_price, Some(p) if p < Decimal::ZERO) {
            return Err("exit_price must not be negative".into());
        }
        Ok(())
    }
}

/// Partial edit of an existing trade. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeUpdate {
    pub symbol: Option<String>,
    pub side: Option<Side>,
    pub quantity: Option<Decimal>,
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub trade_date: Option<NaiveDate>,
    pub strategy_id: Option<Uuid>,
    pub emotional_state: Option<Vec<String>>,
    pub market: Option<String>,
    pub notes: Option<String>,
}

impl TradeUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.symbol, Some(s) if s.trim().is_empty()) {
            return Err("symbol must not be empty".into());
        }
        if matches!(self.quantity, Some(q) if q <= Decimal::ZERO) {
            return Err("quantity must be positive".into());
        }
        if matches!(self.entry_price, Some(p) if p < Decimal::ZERO) {
            return Err("entry_price must not be negative".into());
        }
        if matches!(self.exit_price, Some(p) if p < Decimal::ZERO) {
            return Err("exit_price must not be negative".into());
        }
        Ok(())
    }
}
