use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use metrics::{counter, histogram};

use crate::analytics::{compute_statistics, pnl_history as build_pnl_history, PnlPoint, TradeStatistics};
use crate::db::trade_repo;
use crate::errors::AppError;
use crate::models::AuthUser;
use crate::AppState;

use super::trades::TradeQuery;
use super::ApiResponse;

/// GET /api/statistics: aggregate metrics over the filtered trades.
/// `limit`/`page` are ignored; statistics always cover every match.
pub async fn statistics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<TradeQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TradeStatistics>>, AppError> {
    let Query(query) = query?;
    let trades = trade_repo::list_trades(&state.db, user.id, &query.filter(), None).await?;

    counter!("statistics_computed_total").increment(1);
    histogram!("statistics_input_trades").record(trades.len() as f64);

    Ok(Json(ApiResponse::ok(compute_statistics(&trades))))
}

/// GET /api/analytics/pnl-history: daily and cumulative P&L
pub async fn pnl_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<TradeQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<PnlPoint>>>, AppError> {
    let Query(query) = query?;
    let trades = trade_repo::list_trades(&state.db, user.id, &query.filter(), None).await?;
    Ok(Json(ApiResponse::ok(build_pnl_history(&trades))))
}
