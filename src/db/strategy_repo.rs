use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{NewStrategy, Strategy, StrategyRow};

async fn insert_rules(
    tx: &mut Transaction<'_, Postgres>,
    strategy_id: Uuid,
    rules: &[String],
) -> anyhow::Result<()> {
    for (position, rule) in rules.iter().enumerate() {
        sqlx::query(
            "INSERT INTO strategy_rules (strategy_id, position, rule_text) VALUES ($1, $2, $3)",
        )
        .bind(strategy_id)
        .bind(position as i32)
        .bind(rule)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Rules for the given strategies, keyed by strategy, in rule order.
async fn load_rules(pool: &PgPool, ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, Vec<String>>> {
    let rows = sqlx::query_as::<_, (Uuid, String)>(
        r#"
        SELECT strategy_id, rule_text FROM strategy_rules
        WHERE strategy_id = ANY($1)
        ORDER BY strategy_id, position
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    let mut rules: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (strategy_id, rule) in rows {
        rules.entry(strategy_id).or_default().push(rule);
    }

    Ok(rules)
}

/// Create a strategy and its ordered rules in one transaction.
pub async fn create_strategy(
    pool: &PgPool,
    user_id: Uuid,
    input: &NewStrategy,
) -> anyhow::Result<Strategy> {
    let rules = input.normalized_rules();
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, StrategyRow>(
        r#"
        INSERT INTO strategies (user_id, name, description, is_active)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(input.name.trim())
    .bind(input.description.as_deref())
    .bind(input.is_active.unwrap_or(true))
    .fetch_one(&mut *tx)
    .await?;

    insert_rules(&mut tx, row.id, &rules).await?;
    tx.commit().await?;

    Ok(Strategy::from_row(row, rules))
}

pub async fn list_strategies(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Strategy>> {
    let rows = sqlx::query_as::<_, StrategyRow>(
        "SELECT * FROM strategies WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut rules = load_rules(pool, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let strategy_rules = rules.remove(&row.id).unwrap_or_default();
            Strategy::from_row(row, strategy_rules)
        })
        .collect())
}

pub async fn get_strategy(pool: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Strategy>> {
    let row = sqlx::query_as::<_, StrategyRow>(
        "SELECT * FROM strategies WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let rules = load_rules(pool, &[row.id]).await?.remove(&row.id).unwrap_or_default();
    Ok(Some(Strategy::from_row(row, rules)))
}

/// Replace name, description, activity flag and the full rule list.
pub async fn replace_strategy(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &NewStrategy,
) -> anyhow::Result<Option<Strategy>> {
    let rules = input.normalized_rules();
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, StrategyRow>(
        r#"
        UPDATE strategies
        SET name = $3, description = $4, is_active = COALESCE($5, is_active), updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(input.name.trim())
    .bind(input.description.as_deref())
    .bind(input.is_active)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM strategy_rules WHERE strategy_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_rules(&mut tx, id, &rules).await?;
    tx.commit().await?;

    Ok(Some(Strategy::from_row(row, rules)))
}

/// Delete a strategy. Trades that referenced it are kept and detached.
/// Returns the number of detached trades, or None if the strategy was not found.
pub async fn delete_strategy(pool: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<u64>> {
    let mut tx = pool.begin().await?;

    let deleted: Option<(Uuid,)> = sqlx::query_as(
        "DELETE FROM strategies WHERE id = $1 AND user_id = $2 RETURNING id",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    if deleted.is_none() {
        return Ok(None);
    }

    let detached = sqlx::query(
        "UPDATE trades SET strategy_id = NULL, updated_at = NOW() WHERE strategy_id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    Ok(Some(detached))
}

pub async fn count_strategies(pool: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM strategies WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}
