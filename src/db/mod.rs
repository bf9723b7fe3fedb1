pub mod strategy_repo;
pub mod trade_repo;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn init_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

/// Apply the schema migrations embedded from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// LIMIT/OFFSET window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// `page` is 1-based; `limit` is clamped to `1..=max_limit`. Offsets past
    /// `i64::MAX` saturate, which yields an empty window.
    pub fn new(limit: Option<i64>, page: Option<i64>, default_limit: i64, max_limit: i64) -> Self {
        let limit = limit.unwrap_or(default_limit).clamp(1, max_limit);
        let page = page.unwrap_or(1).max(1);
        Self {
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }

    /// 1-based page number this window starts on.
    pub fn number(&self) -> i64 {
        (self.offset / self.limit).saturating_add(1)
    }
}
