use sqlx::SqlitePool;
use std::time::Duration;
use tracing::warn;

use crate::database::feed_storage_repo;
use crate::models::SearchParameters;

/// Current search filters. Never fails: storage errors and unparseable data
/// degrade to defaults.
pub async fn load_search_parameters(pool: &SqlitePool) -> SearchParameters {
    let raw = match feed_storage_repo::get_value(pool, feed_storage_repo::KEY_SEARCH_PARAMS).await
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!("🔎 Search parameters read failed, using defaults: {}", e);
            None
        }
    };
    SearchParameters::from_stored(raw.as_deref())
}

/// User-configured GPS acquisition timeout, in milliseconds in storage.
pub async fn load_gps_timeout_override(pool: &SqlitePool) -> Option<Duration> {
    let raw = match feed_storage_repo::get_value(pool, feed_storage_repo::KEY_GPS_TIMEOUT_MS).await
    {
        Ok(raw) => raw?,
        Err(e) => {
            warn!("📍 GPS timeout override read failed: {}", e);
            return None;
        }
    };
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::open_in_memory;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn reads_stored_parameters() {
        let pool = open_in_memory().await.unwrap();
        assert_eq!(
            load_search_parameters(&pool).await,
            SearchParameters::default()
        );

        feed_storage_repo::set_value(
            &pool,
            feed_storage_repo::KEY_SEARCH_PARAMS,
            r#"{"distance": 25, "showOutsideParameters": false}"#,
        )
        .await
        .unwrap();

        let params = load_search_parameters(&pool).await;
        assert_eq!(params.distance_radius, 25);
        assert!(!params.show_outside_parameters);
    }

    #[tokio::test]
    async fn gps_override_parsing() {
        let pool = open_in_memory().await.unwrap();
        assert_eq!(load_gps_timeout_override(&pool).await, None);

        feed_storage_repo::set_value(&pool, feed_storage_repo::KEY_GPS_TIMEOUT_MS, "25000")
            .await
            .unwrap();
        assert_eq!(
            load_gps_timeout_override(&pool).await,
            Some(Duration::from_secs(25))
        );

        feed_storage_repo::set_value(&pool, feed_storage_repo::KEY_GPS_TIMEOUT_MS, "soon")
            .await
            .unwrap();
        assert_eq!(load_gps_timeout_override(&pool).await, None);
    }
}
