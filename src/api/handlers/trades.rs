use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use metrics::counter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::TradeFilter;
use crate::db::{strategy_repo, trade_repo, Page};
use crate::errors::AppError;
use crate::models::{AuthUser, NewTrade, Side, Trade, TradeUpdate};
use crate::AppState;

use super::ApiResponse;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 500;

/// Query string accepted by the trade list and the analytics endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TradeQuery {
    pub market: Option<String>,
    pub strategy_id: Option<Uuid>,
    pub side: Option<Side>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

impl TradeQuery {
    pub fn filter(&self) -> TradeFilter {
        TradeFilter {
            market: self.market.clone(),
            strategy_id: self.strategy_id,
            side: self.side,
            from: self.from,
            to: self.to,
        }
    }
}

#[derive(Serialize)]
pub struct TradePage {
    pub trades: Vec<Trade>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
}

async fn ensure_strategy_exists(
    state: &AppState,
    user_id: Uuid,
    strategy_id: Option<Uuid>,
) -> Result<(), AppError> {
    if let Some(id) = strategy_id {
        if strategy_repo::get_strategy(&state.db, user_id, id).await?.is_none() {
            return Err(AppError::BadRequest(format!("strategy {id} does not exist")));
        }
    }
    Ok(())
}

/// GET /api/trades: filtered, paginated trade list
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<TradeQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TradePage>>, AppError> {
    let Query(query) = query?;
    let filter = query.filter();
    let page = Page::new(query.limit, query.page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

    let trades = trade_repo::list_trades(&state.db, user.id, &filter, Some(page)).await?;
    let total_count = trade_repo::count_trades(&state.db, user.id, &filter).await?;

    Ok(Json(ApiResponse::ok(TradePage {
        trades,
        total_count,
        page: page.number(),
        limit: page.limit,
    })))
}

/// POST /api/trades: log a new trade
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewTrade>,
) -> Result<Json<ApiResponse<Trade>>, AppError> {
    body.validate().map_err(AppError::BadRequest)?;
    ensure_strategy_exists(&state, user.id, body.strategy_id).await?;

    let trade = trade_repo::insert_trade(&state.db, user.id, &body).await?;
    counter!("trades_created_total").increment(1);
    tracing::info!(
        trade_id = %trade.id,
        symbol = %trade.symbol,
        side = %trade.side,
        "Trade logged"
    );

    Ok(Json(ApiResponse::ok(trade)))
}

/// GET /api/trades/{id}
pub async fn detail(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Trade>>, AppError> {
    let trade = trade_repo::get_trade(&state.db, user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    Ok(Json(ApiResponse::ok(trade)))
}

/// PUT /api/trades/{id}: partial edit
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<TradeUpdate>,
) -> Result<Json<ApiResponse<Trade>>, AppError> {
    body.validate().map_err(AppError::BadRequest)?;
    ensure_strategy_exists(&state, user.id, body.strategy_id).await?;

    let trade = trade_repo::update_trade(&state.db, user.id, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;
    counter!("trades_updated_total").increment(1);

    Ok(Json(ApiResponse::ok(trade)))
}

/// DELETE /api/trades/{id}
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    if !trade_repo::delete_trade(&state.db, user.id, id).await? {
        return Err(AppError::NotFound("trade not found".into()));
    }
    counter!("trades_deleted_total").increment(1);
    tracing::info!(trade_id = %id, "Trade deleted");

    Ok(Json(ApiResponse::ok(id)))
}
