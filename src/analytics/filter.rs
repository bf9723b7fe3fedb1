use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{Side, Trade};

/// Case-insensitive market match. A missing or empty market never matches.
pub fn market_matches(trade_market: Option<&str>, selected: &str) -> bool {
    match trade_market {
        Some(market) if !market.is_empty() => market.to_lowercase() == selected.to_lowercase(),
        _ => false,
    }
}

/// Trade selection shared by the list, statistics and analytics endpoints.
/// `trade_repo::list_trades` applies the same predicates in SQL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeFilter {
    pub market: Option<String>,
    pub strategy_id: Option<Uuid>,
    pub side: Option<Side>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TradeFilter {
    pub fn matches(&self, trade: &Trade) -> bool {
        if let Some(selected) = self.market.as_deref().filter(|m| !m.is_empty()) {
            if !market_matches(trade.market.as_deref(), selected) {
                return false;
            }
        }
        if let Some(strategy_id) = self.strategy_id {
            if trade.strategy_id != Some(strategy_id) {
                return false;
            }
        }
        if let Some(side) = self.side {
            if trade.side() != Some(side) {
                return false;
            }
        }
        if matches!(self.from, Some(from) if trade.trade_date < from) {
            return false;
        }
        if matches!(self.to, Some(to) if trade.trade_date > to) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, trades: &'a [Trade]) -> Vec<&'a Trade> {
        trades.iter().filter(|t| self.matches(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn trade(market: Option<&str>, side: &str, day: u32) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            symbol: "ES".into(),
            side: side.into(),
            quantity: Decimal::ONE,
            entry_price: Decimal::from(5000),
            exit_price: None,
            pnl: Some(Decimal::from(10)),
            trade_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            strategy_id: None,
            emotional_state: vec![],
            market: market.map(str::to_string),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_market_matches_any_case() {
        for stored in ["stock", "Stock", "STOCK"] {
            assert!(market_matches(Some(stored), "stock"));
            assert!(market_matches(Some(stored), "Stock"));
        }
        assert!(!market_matches(Some("forex"), "stock"));
    }

    #[test]
    fn test_market_missing_never_matches() {
        assert!(!market_matches(None, "stock"));
        assert!(!market_matches(Some(""), "stock"));
        assert!(!market_matches(None, ""));
    }

    #[test]
    fn test_market_not_trimmed() {
        assert!(!market_matches(Some(" stock"), "stock"));
    }

    #[test]
    fn test_filter_by_market_returns_all_casings() {
        let trades = vec![
            trade(Some("stock"), "Buy", 1),
            trade(Some("Stock"), "Buy", 2),
            trade(Some("STOCK"), "Sell", 3),
            trade(Some("FOREX"), "Buy", 4),
            trade(None, "Buy", 5),
        ];
        let filter = TradeFilter {
            market: Some("sToCk".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&trades).len(), 3);
    }

    #[test]
    fn test_filter_side_and_dates() {
        let trades = vec![
            trade(Some("futures"), "Buy", 1),
            trade(Some("futures"), "Sell", 10),
            trade(Some("futures"), "Buy", 20),
        ];
        let filter = TradeFilter {
            side: Some(Side::Buy),
            from: NaiveDate::from_ymd_opt(2024, 5, 5),
            to: NaiveDate::from_ymd_opt(2024, 5, 31),
            ..Default::default()
        };
        let selected = filter.apply(&trades);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].trade_date.to_string(), "2024-05-20");
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let trades = vec![trade(None, "Buy", 1), trade(Some("crypto"), "Sell", 2)];
        assert_eq!(TradeFilter::default().apply(&trades).len(), 2);
    }
}
