use sqlx::SqlitePool;

// Well-known durable keys.
pub const KEY_LATITUDE: &str = "feed.latitude";
pub const KEY_LONGITUDE: &str = "feed.longitude";
pub const KEY_SEARCH_PARAMS: &str = "feed.search_params";
pub const KEY_GPS_TIMEOUT_MS: &str = "feed.gps_timeout_ms";
pub const KEY_RELOAD_REQUESTED: &str = "feed.reload_requested";
pub const KEY_REMOVE_TOP_REQUESTED: &str = "feed.remove_top_requested";

const SQL_CREATE_FEED_STORAGE: &str = r#"
CREATE TABLE IF NOT EXISTS feed_storage (
  key TEXT PRIMARY KEY NOT NULL,
  value TEXT NOT NULL
)
"#;

const SQL_GET_VALUE: &str = r#"
SELECT value
FROM feed_storage
WHERE key = ?1
"#;

const SQL_SET_VALUE: &str = r#"
INSERT INTO feed_storage (key, value)
VALUES (?1, ?2)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#;

const SQL_DELETE_VALUE: &str = r#"
DELETE FROM feed_storage
WHERE key = ?1
"#;

const SQL_TAKE_VALUE: &str = r#"
DELETE FROM feed_storage
WHERE key = ?1
RETURNING value
"#;

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(SQL_CREATE_FEED_STORAGE).execute(pool).await?;
    Ok(())
}

pub async fn get_value(pool: &SqlitePool, key: &str) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar::<_, String>(SQL_GET_VALUE)
        .bind(key)
        .fetch_optional(pool)
        .await
}

pub async fn set_value(pool: &SqlitePool, key: &str, value: &str) -> sqlx::Result<()> {
    sqlx::query(SQL_SET_VALUE)
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_value(pool: &SqlitePool, key: &str) -> sqlx::Result<()> {
    sqlx::query(SQL_DELETE_VALUE).bind(key).execute(pool).await?;
    Ok(())
}

/// Reads and removes every key in `keys` inside a single transaction, so a
/// writer can never land between the read and the clear. Returns the prior
/// values in the order of `keys`.
pub async fn take_values(pool: &SqlitePool, keys: &[&str]) -> sqlx::Result<Vec<Option<String>>> {
    let mut tx = pool.begin().await?;
    let mut values = Vec::with_capacity(keys.len());
    for key in keys {
        let value = sqlx::query_scalar::<_, String>(SQL_TAKE_VALUE)
            .bind(*key)
            .fetch_optional(&mut *tx)
            .await?;
        values.push(value);
    }
    tx.commit().await?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::open_in_memory;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn set_overwrites_and_take_clears() {
        let pool = open_in_memory().await.unwrap();

        set_value(&pool, KEY_LATITUDE, "1.5").await.unwrap();
        set_value(&pool, KEY_LATITUDE, "2.5").await.unwrap();
        assert_eq!(
            get_value(&pool, KEY_LATITUDE).await.unwrap().as_deref(),
            Some("2.5")
        );

        let taken = take_values(&pool, &[KEY_LATITUDE, KEY_LONGITUDE])
            .await
            .unwrap();
        assert_eq!(taken, vec![Some("2.5".to_string()), None]);
        assert_eq!(get_value(&pool, KEY_LATITUDE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_missing_key_is_noop() {
        let pool = open_in_memory().await.unwrap();
        delete_value(&pool, KEY_GPS_TIMEOUT_MS).await.unwrap();
        assert_eq!(get_value(&pool, KEY_GPS_TIMEOUT_MS).await.unwrap(), None);
    }
}
