use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Serialize, Serializer};

use crate::models::Trade;

/// Anything carrying a (possibly missing) P&L amount.
pub trait PnlRecord {
    fn pnl(&self) -> Option<Decimal>;
}

impl PnlRecord for Trade {
    fn pnl(&self) -> Option<Decimal> {
        self.pnl
    }
}

impl PnlRecord for Option<Decimal> {
    fn pnl(&self) -> Option<Decimal> {
        *self
    }
}

impl PnlRecord for Decimal {
    fn pnl(&self) -> Option<Decimal> {
        Some(*self)
    }
}

/// Gross profit over gross loss. `Infinite` when there are gains but no losses;
/// serialized as the string `"Infinite"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfitFactor {
    Finite(Decimal),
    Infinite,
}

impl ProfitFactor {
    pub fn is_infinite(&self) -> bool {
        matches!(self, ProfitFactor::Infinite)
    }
}

impl Default for ProfitFactor {
    fn default() -> Self {
        ProfitFactor::Finite(Decimal::ZERO)
    }
}

impl Serialize for ProfitFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProfitFactor::Finite(value) => Serialize::serialize(value, serializer),
            ProfitFactor::Infinite => serializer.serialize_str("Infinite"),
        }
    }
}

/// Summary metrics over a set of trades. Every field is zero for empty input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStatistics {
    pub total_trades: i64,
    pub winning_trades: i64,
    pub losing_trades: i64,
    pub break_even_trades: i64,
    #[serde(rename = "totalPnL")]
    pub total_pnl: Decimal,
    /// Percentage, 0-100.
    pub win_rate: Decimal,
    pub gross_profit: Decimal,
    /// Sum of losing P&L, kept negative.
    pub gross_loss: Decimal,
    pub average_win: Decimal,
    /// Magnitude of the average loss.
    pub average_loss: Decimal,
    pub largest_win: Decimal,
    pub largest_loss: Decimal,
    pub trade_expectancy: Decimal,
    pub sharpe_ratio: Decimal,
    pub profit_factor: ProfitFactor,
}

/// Reduce a set of trades into [`TradeStatistics`] in a single pass.
///
/// A missing P&L counts as 0: it adds to `total_trades` and to the Sharpe
/// sample but is neither a win nor a loss. Never panics: gross sums saturate
/// at the `Decimal` bounds.
pub fn compute_statistics<T: PnlRecord>(records: &[T]) -> TradeStatistics {
    if records.is_empty() {
        return TradeStatistics::default();
    }

    let mut winning_trades = 0i64;
    let mut losing_trades = 0i64;
    let mut gross_profit = Decimal::ZERO;
    let mut gross_loss = Decimal::ZERO;
    let mut largest_win = Decimal::ZERO;
    let mut largest_loss = Decimal::ZERO;
    let mut returns = Vec::with_capacity(records.len());

    for record in records {
        let pnl = record.pnl().unwrap_or(Decimal::ZERO);
        if pnl > Decimal::ZERO {
            winning_trades += 1;
            gross_profit = gross_profit.saturating_add(pnl);
            largest_win = largest_win.max(pnl);
        } else if pnl < Decimal::ZERO {
            losing_trades += 1;
            gross_loss = gross_loss.saturating_add(pnl);
            largest_loss = largest_loss.min(pnl);
        }
        returns.push(pnl);
    }

    let total_trades = records.len() as i64;
    let total = Decimal::from(total_trades);
    let total_pnl = gross_profit + gross_loss;

    let win_rate = Decimal::from(winning_trades) * Decimal::ONE_HUNDRED / total;

    let average_win = if winning_trades > 0 {
        gross_profit / Decimal::from(winning_trades)
    } else {
        Decimal::ZERO
    };
    let average_loss = if losing_trades > 0 {
        gross_loss.abs() / Decimal::from(losing_trades)
    } else {
        Decimal::ZERO
    };

    let trade_expectancy = Decimal::from(winning_trades) / total * average_win
        - Decimal::from(losing_trades) / total * average_loss;

    TradeStatistics {
        total_trades,
        winning_trades,
        losing_trades,
        break_even_trades: total_trades - winning_trades - losing_trades,
        total_pnl,
        win_rate,
        gross_profit,
        gross_loss,
        average_win,
        average_loss,
        largest_win,
        largest_loss,
        trade_expectancy,
        sharpe_ratio: sharpe_ratio(&returns),
        profit_factor: profit_factor(gross_profit, gross_loss),
    }
}

/// mean(returns) / population stddev(returns).
/// Zero with fewer than two samples, when every return is equal, or when the
/// sample is too large to square within `Decimal` range.
pub fn sharpe_ratio(returns: &[Decimal]) -> Decimal {
    if returns.len() < 2 {
        return Decimal::ZERO;
    }
    checked_sharpe(returns).unwrap_or(Decimal::ZERO)
}

fn checked_sharpe(returns: &[Decimal]) -> Option<Decimal> {
    let n = Decimal::from(returns.len() as i64);
    let sum = returns
        .iter()
        .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(*r))?;
    let mean = sum.checked_div(n)?;

    let squares = returns.iter().try_fold(Decimal::ZERO, |acc, r| {
        let diff = r.checked_sub(mean)?;
        acc.checked_add(diff.checked_mul(diff)?)
    })?;
    let variance = squares.checked_div(n)?;

    let std_dev = variance.sqrt()?;
    if std_dev.is_zero() {
        return None;
    }
    mean.checked_div(std_dev)
}

/// `gross_loss` is the (non-positive) sum of losing trades.
pub fn profit_factor(gross_profit: Decimal, gross_loss: Decimal) -> ProfitFactor {
    if gross_loss.is_zero() {
        if gross_profit > Decimal::ZERO {
            return ProfitFactor::Infinite;
        }
        return ProfitFactor::Finite(Decimal::ZERO);
    }
    gross_profit
        .checked_div(gross_loss.abs())
        .map_or(ProfitFactor::Infinite, ProfitFactor::Finite)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
