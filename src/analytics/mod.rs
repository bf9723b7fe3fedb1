pub mod filter;
pub mod pnl;
pub mod statistics;

pub use filter::{market_matches, TradeFilter};
pub use pnl::{pnl_history, PnlPoint};
pub use statistics::{compute_statistics, PnlRecord, ProfitFactor, TradeStatistics};
