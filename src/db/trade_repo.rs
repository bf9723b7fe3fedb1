use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::Page;
use crate::analytics::TradeFilter;
use crate::models::{ConfluenceTrade, NewTrade, Trade, TradeUpdate};

/// Insert a new trade for a user.
pub async fn insert_trade(pool: &PgPool, user_id: Uuid, trade: &NewTrade) -> anyhow::Result<Trade> {
    let row = sqlx::query_as::<_, Trade>(
        r#"
        INSERT INTO trades (user_id, symbol, side, quantity, entry_price, exit_price, pnl,
                            trade_date, strategy_id, emotional_state, market, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(trade.symbol.trim())
    .bind(trade.side.as_db_str())
    .bind(trade.quantity)
    .bind(trade.entry_price)
    .bind(trade.exit_price)
    .bind(trade.pnl)
    .bind(trade.trade_date)
    .bind(trade.strategy_id)
    .bind(trade.emotional_state.as_slice())
    .bind(trade.market.as_deref())
    .bind(trade.notes.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_trade(pool: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Trade>> {
    let trade = sqlx::query_as::<_, Trade>("SELECT * FROM trades WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(trade)
}

/// WHERE clause shared by list and count. Mirrors `TradeFilter::matches`.
fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, user_id: Uuid, filter: &'a TradeFilter) {
    qb.push(" WHERE user_id = ").push_bind(user_id);

    if let Some(market) = filter.market.as_deref().filter(|m| !m.is_empty()) {
        qb.push(" AND LOWER(market) = LOWER(")
            .push_bind(market)
            .push(")");
    }
    if let Some(strategy_id) = filter.strategy_id {
        qb.push(" AND strategy_id = ").push_bind(strategy_id);
    }
    if let Some(side) = filter.side {
        qb.push(" AND side = ").push_bind(side.as_db_str());
    }
    if let Some(from) = filter.from {
        qb.push(" AND trade_date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND trade_date <= ").push_bind(to);
    }
}

/// Trades matching `filter`, newest first. All matches when `page` is None.
pub async fn list_trades(
    pool: &PgPool,
    user_id: Uuid,
    filter: &TradeFilter,
    page: Option<Page>,
) -> anyhow::Result<Vec<Trade>> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM trades");
    push_filter(&mut qb, user_id, filter);
    qb.push(" ORDER BY trade_date DESC, created_at DESC");

    if let Some(page) = page {
        qb.push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);
    }

    let trades = qb.build_query_as::<Trade>().fetch_all(pool).await?;
    Ok(trades)
}

pub async fn count_trades(pool: &PgPool, user_id: Uuid, filter: &TradeFilter) -> anyhow::Result<i64> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM trades");
    push_filter(&mut qb, user_id, filter);

    let row = qb.build_query_as::<(i64,)>().fetch_one(pool).await?;
    Ok(row.0)
}

/// Apply a partial edit. Returns None when the trade does not exist for this user.
pub async fn update_trade(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    update: &TradeUpdate,
) -> anyhow::Result<Option<Trade>> {
    let trade = sqlx::query_as::<_, Trade>(
        r#"
        UPDATE trades SET
            symbol          = COALESCE($3, symbol),
            side            = COALESCE($4, side),
            quantity        = COALESCE($5, quantity),
            entry_price     = COALESCE($6, entry_price),
            exit_price      = COALESCE($7, exit_price),
            pnl             = COALESCE($8, pnl),
            trade_date      = COALESCE($9, trade_date),
            strategy_id     = COALESCE($10, strategy_id),
            emotional_state = COALESCE($11, emotional_state),
            market          = COALESCE($12, market),
            notes           = COALESCE($13, notes),
            updated_at      = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(update.symbol.as_deref().map(str::trim))
    .bind(update.side.map(|s| s.as_db_str()))
    .bind(update.quantity)
    .bind(update.entry_price)
    .bind(update.exit_price)
    .bind(update.pnl)
    .bind(update.trade_date)
    .bind(update.strategy_id)
    .bind(update.emotional_state.as_deref())
    .bind(update.market.as_deref())
    .bind(update.notes.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(trade)
}

/// Returns true when a row was deleted.
pub async fn delete_trade(pool: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM trades WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Trades with their strategy name, newest first.
pub async fn list_confluence_trades(
    pool: &PgPool,
    user_id: Uuid,
    page: Page,
) -> anyhow::Result<Vec<ConfluenceTrade>> {
    let trades = sqlx::query_as::<_, ConfluenceTrade>(
        r#"
        SELECT t.id, t.symbol, t.side, t.quantity, t.entry_price, t.exit_price, t.pnl,
               t.trade_date, t.strategy_id, s.name AS strategy_name, t.emotional_state, t.market
        FROM trades t
        LEFT JOIN strategies s ON s.id = t.strategy_id
        WHERE t.user_id = $1
        ORDER BY t.trade_date DESC, t.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(trades)
}

/// Sum of today's P&L for a user.
pub async fn get_daily_pnl(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Decimal> {
    let row: (Option<Decimal>,) = sqlx::query_as(
        "SELECT COALESCE(SUM(pnl), 0) FROM trades WHERE user_id = $1 AND trade_date = CURRENT_DATE",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(row.0.unwrap_or(Decimal::ZERO))
}
