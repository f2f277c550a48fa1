//! PostgreSQL implementation of `CounterStore`.
//!
//! The counter lives in a single row of the `counter` table. Increments are
//! one `UPDATE ... RETURNING` statement, so the database's row lock provides
//! the mutual exclusion between concurrent requests.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tally_core::{CounterStore, TallyError, TallyResult, COUNTER_ROW_ID};
use tracing::info;

/// PostgreSQL counter store.
///
/// Uses sqlx with connection pooling; the pool is the only shared resource.
pub struct PostgresCounterStore {
    pool: PgPool,
    row_id: i32,
}

impl PostgresCounterStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            row_id: COUNTER_ROW_ID,
        }
    }

    /// Opens a connection pool to `database_url`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> TallyResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| storage_error("connect", e))?;

        Ok(Self::new(pool))
    }

    /// Builder: use a different singleton row (isolated test runs)
    pub fn with_row_id(mut self, row_id: i32) -> Self {
        self.row_id = row_id;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn storage_error(operation: &str, e: sqlx::Error) -> TallyError {
    TallyError::Storage(format!("Postgres {} failed: {}", operation, e))
}

#[async_trait]
impl CounterStore for PostgresCounterStore {
    async fn init(&self) -> TallyResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS counter (
                id INTEGER PRIMARY KEY,
                count BIGINT NOT NULL DEFAULT 0 CHECK (count >= 0)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("create table", e))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO counter (id, count) VALUES ($1, 0)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(self.row_id)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("seed row", e))?;

        if inserted.rows_affected() > 0 {
            info!("Created counter row id={}", self.row_id);
        }

        Ok(())
    }

    async fn increment_and_get(&self) -> TallyResult<i64> {
        // Cast keeps compatibility with tables created with an INTEGER column
        sqlx::query_scalar::<_, i64>(
            "UPDATE counter SET count = count + 1 WHERE id = $1 RETURNING count::BIGINT",
        )
        .bind(self.row_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("increment", e))?
        .ok_or_else(|| TallyError::Storage(format!("Counter row {} missing", self.row_id)))
    }

    async fn get(&self) -> TallyResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT count::BIGINT FROM counter WHERE id = $1")
            .bind(self.row_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("read", e))?
            .ok_or_else(|| TallyError::Storage(format!("Counter row {} missing", self.row_id)))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
