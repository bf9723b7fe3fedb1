use axum::extract::{Path, State};
use axum::{Extension, Json};
use metrics::counter;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::analytics::{compute_statistics, TradeFilter, TradeStatistics};
use crate::db::{strategy_repo, trade_repo};
use crate::errors::AppError;
use crate::models::{AuthUser, NewStrategy, Strategy};
use crate::AppState;

use super::ApiResponse;

#[derive(Serialize)]
pub struct StrategyPerformance {
    pub strategy_id: Uuid,
    pub name: String,
    pub statistics: TradeStatistics,
}

/// GET /api/strategies
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<Strategy>>>, AppError> {
    let strategies = strategy_repo::list_strategies(&state.db, user.id).await?;
    Ok(Json(ApiResponse::ok(strategies)))
}

/// POST /api/strategies
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewStrategy>,
) -> Result<Json<ApiResponse<Strategy>>, AppError> {
    body.validate().map_err(AppError::BadRequest)?;

    let strategy = strategy_repo::create_strategy(&state.db, user.id, &body).await?;
    counter!("strategies_created_total").increment(1);
    tracing::info!(
        strategy_id = %strategy.id,
        rules = strategy.rules.len(),
        "Strategy created"
    );

    Ok(Json(ApiResponse::ok(strategy)))
}

/// GET /api/strategies/{id}
pub async fn detail(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Strategy>>, AppError> {
    let strategy = strategy_repo::get_strategy(&state.db, user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("strategy not found".into()))?;

    Ok(Json(ApiResponse::ok(strategy)))
}

/// PUT /api/strategies/{id}: replace fields and the whole rule list
pub async fn replace(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<NewStrategy>,
) -> Result<Json<ApiResponse<Strategy>>, AppError> {
    body.validate().map_err(AppError::BadRequest)?;

    let strategy = strategy_repo::replace_strategy(&state.db, user.id, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound("strategy not found".into()))?;

    Ok(Json(ApiResponse::ok(strategy)))
}

/// DELETE /api/strategies/{id}: referencing trades are kept and detached
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let detached = strategy_repo::delete_strategy(&state.db, user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("strategy not found".into()))?;

    tracing::info!(strategy_id = %id, detached_trades = detached, "Strategy deleted");

    Ok(Json(ApiResponse::ok(json!({
        "id": id,
        "detached_trades": detached,
    }))))
}

/// GET /api/strategies/{id}/performance: statistics over the strategy's trades
pub async fn performance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StrategyPerformance>>, AppError> {
    let strategy = strategy_repo::get_strategy(&state.db, user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("strategy not found".into()))?;

    let filter = TradeFilter {
        strategy_id: Some(id),
        ..Default::default()
    };
    let trades = trade_repo::list_trades(&state.db, user.id, &filter, None).await?;
    counter!("statistics_computed_total").increment(1);

    Ok(Json(ApiResponse::ok(StrategyPerformance {
        strategy_id: strategy.id,
        name: strategy.name,
        statistics: compute_statistics(&trades),
    })))
}
