//! Statement execution seam.
//!
//! The engine only ever issues DDL and DML and never reads results back, so a
//! driver only has to report success or failure for a single statement.
//!
//! ## Connectivity
//!
//! - [`db()`] — Establishes a MySQL connection pool from `DB_URL`
use crate::*;

/// Executes one SQL statement against the target database.
///
/// Implementations are shared across every writer without extra locking,
/// so any pooling or serialization is the implementation's concern.
#[async_trait::async_trait]
pub trait Database: Send + Sync + 'static {
    async fn exec(&self, sql: &str) -> std::result::Result<(), DbError>;
}

#[cfg(feature = "database")]
#[async_trait::async_trait]
impl Database for sqlx::MySqlPool {
    async fn exec(&self, sql: &str) -> std::result::Result<(), DbError> {
        sqlx::raw_sql(sql)
            .execute(self)
            .await
            .map(|_| ())
            .map_err(DbError::from)
    }
}

/// Establishes a connection pool.
///
/// Connects to a MySQL-compatible server using the `DB_URL` environment
/// variable (e.g., `mysql://root@127.0.0.1:4000/test`), holding at most
/// `connections` connections.
#[cfg(feature = "database")]
pub async fn db(connections: u32) -> anyhow::Result<std::sync::Arc<sqlx::MySqlPool>> {
    log::info!("connecting to database");
    let ref url = std::env::var("DB_URL").map_err(|_| anyhow::anyhow!("DB_URL must be set"))?;
    let pool = sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(connections)
        .connect(url)
        .await?;
    Ok(std::sync::Arc::new(pool))
}
