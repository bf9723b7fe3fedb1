use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::TradeFilter;
use crate::db::{trade_repo, Page};
use crate::errors::AppError;
use crate::models::{AuthUser, ConfluenceTrade};
use crate::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ConfluenceQuery {
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfluenceResponse {
    pub trades: Vec<ConfluenceTrade>,
    pub total_count: i64,
    pub request_id: Uuid,
}

/// GET /api/confluence-trades: trades with strategy names, paginated
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ConfluenceQuery>, QueryRejection>,
) -> Result<Json<ConfluenceResponse>, AppError> {
    let Query(query) = query?;
    let request_id = Uuid::new_v4();
    let page = Page::new(query.limit, query.page, DEFAULT_LIMIT, MAX_LIMIT);

    tracing::debug!(
        %request_id,
        user_id = %user.id,
        limit = page.limit,
        offset = page.offset,
        "Confluence trades requested"
    );

    let trades = trade_repo::list_confluence_trades(&state.db, user.id, page).await?;
    let total_count = trade_repo::count_trades(&state.db, user.id, &TradeFilter::default()).await?;

    Ok(Json(ConfluenceResponse {
        trades,
        total_count,
        request_id,
    }))
}
