use axum::extract::State;
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::analytics::{compute_statistics, TradeFilter, TradeStatistics};
use crate::db::{strategy_repo, trade_repo};
use crate::models::AuthUser;
use crate::AppState;

#[derive(Serialize)]
pub struct DashboardSummary {
    pub statistics: TradeStatistics,
    pub strategy_count: i64,
    pub today_pnl: String,
}

/// Failed reads fall back to zero values instead of an error.
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Json<DashboardSummary> {
    let trades = match trade_repo::list_trades(&state.db, user.id, &TradeFilter::default(), None).await {
        Ok(trades) => trades,
        Err(e) => {
            tracing::warn!(error = %e, user_id = %user.id, "Dashboard: failed to load trades");
            Vec::new()
        }
    };

    let strategy_count = strategy_repo::count_strategies(&state.db, user.id)
        .await
        .unwrap_or(0);

    let today_pnl = trade_repo::get_daily_pnl(&state.db, user.id)
        .await
        .unwrap_or(Decimal::ZERO);

    Json(DashboardSummary {
        statistics: compute_statistics(&trades),
        strategy_count,
        today_pnl: today_pnl.to_string(),
    })
}
