use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Trade;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlPoint {
    pub date: NaiveDate,
    pub daily_pnl: Decimal,
    pub cumulative_pnl: Decimal,
}

/// Daily P&L and running total, ascending by trade date.
pub fn pnl_history<'a, I>(trades: I) -> Vec<PnlPoint>
where
    I: IntoIterator<Item = &'a Trade>,
{
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for trade in trades {
        *by_day.entry(trade.trade_date).or_insert(Decimal::ZERO) += trade.pnl_or_zero();
    }

    let mut cumulative = Decimal::ZERO;
    by_day
        .into_iter()
        .map(|(date, daily_pnl)| {
            cumulative += daily_pnl;
            PnlPoint {
                date,
                daily_pnl,
                cumulative_pnl: cumulative,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn trade(day: u32, pnl: Option<i64>) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            symbol: "EURUSD".into(),
            side: "Buy".into(),
            quantity: Decimal::ONE,
            entry_price: Decimal::ONE,
            exit_price: None,
            pnl: pnl.map(Decimal::from),
            trade_date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            strategy_id: None,
            emotional_state: vec![],
            market: Some("forex".into()),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_history_groups_and_accumulates() {
        let trades = vec![
            trade(3, Some(-20)),
            trade(1, Some(100)),
            trade(3, Some(50)),
            trade(2, None),
        ];
        let history = pnl_history(&trades);

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].daily_pnl, Decimal::from(100));
        assert_eq!(history[1].daily_pnl, Decimal::ZERO);
        assert_eq!(history[1].cumulative_pnl, Decimal::from(100));
        assert_eq!(history[2].daily_pnl, Decimal::from(30));
        assert_eq!(history[2].cumulative_pnl, Decimal::from(130));
    }

    #[test]
    fn test_history_empty() {
        assert!(pnl_history(&Vec::<Trade>::new()).is_empty());
    }
}
