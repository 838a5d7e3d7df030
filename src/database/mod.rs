use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub mod feed_storage_repo;

/// Opens (creating if needed) the durable store behind the feed and makes
/// sure its table exists.
pub async fn open_pool(database_url: &str) -> sqlx::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    feed_storage_repo::ensure_schema(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory store. The connection is never recycled, since
/// dropping it would drop the database with it.
pub async fn open_in_memory() -> sqlx::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    feed_storage_repo::ensure_schema(&pool).await?;
    Ok(pool)
}
