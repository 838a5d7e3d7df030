use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::database::feed_storage_repo;

const FLAG_SET: &str = "true";

/// Requests other screens can leave for the feed, acted on the next time the
/// feed gains focus. Both survive restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSignal {
    QueueReloadRequested,
    QueueHeadRemoveRequested,
}

impl FeedSignal {
    fn storage_key(self) -> &'static str {
        match self {
            FeedSignal::QueueReloadRequested => feed_storage_repo::KEY_RELOAD_REQUESTED,
            FeedSignal::QueueHeadRemoveRequested => feed_storage_repo::KEY_REMOVE_TOP_REQUESTED,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "reload" => Some(FeedSignal::QueueReloadRequested),
            "remove-top" => Some(FeedSignal::QueueHeadRemoveRequested),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingSignals {
    pub reload: bool,
    pub remove_top: bool,
}

/// What the feed does with the signals found on focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusAction {
    Reload,
    RemoveHead,
    Nothing,
}

impl PendingSignals {
    /// A reload request always wins; a remove-top request seen together with
    /// it is dropped.
    pub fn resolve(self) -> FocusAction {
        if self.reload {
            FocusAction::Reload
        } else if self.remove_top {
            FocusAction::RemoveHead
        } else {
            FocusAction::Nothing
        }
    }
}

/// Sets the flag for `signal`. Setting an already-set flag is a no-op.
pub async fn publish(pool: &SqlitePool, signal: FeedSignal) -> sqlx::Result<()> {
    info!("📣 Feed signal published: {:?}", signal);
    feed_storage_repo::set_value(pool, signal.storage_key(), FLAG_SET).await
}

pub async fn clear(pool: &SqlitePool, signal: FeedSignal) -> sqlx::Result<()> {
    feed_storage_repo::delete_value(pool, signal.storage_key()).await
}

/// Returns both flags and resets them in one transaction. A storage failure
/// reads as "nothing pending".
pub async fn peek_and_clear(pool: &SqlitePool) -> PendingSignals {
    let keys = [
        FeedSignal::QueueReloadRequested.storage_key(),
        FeedSignal::QueueHeadRemoveRequested.storage_key(),
    ];
    let values = match feed_storage_repo::take_values(pool, &keys).await {
        Ok(values) => values,
        Err(e) => {
            warn!("📣 Reading feed signals failed: {}", e);
            return PendingSignals::default();
        }
    };

    let is_set = |v: Option<&Option<String>>| v.and_then(|v| v.as_deref()) == Some(FLAG_SET);
    PendingSignals {
        reload: is_set(values.first()),
        remove_top: is_set(values.get(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::open_in_memory;
    use pretty_assertions::assert_eq;

    #[test]
    fn reload_wins_over_remove_top() {
        let both = PendingSignals {
            reload: true,
            remove_top: true,
        };
        assert_eq!(both.resolve(), FocusAction::Reload);
        assert_eq!(
            PendingSignals {
                reload: false,
                remove_top: true
            }
            .resolve(),
            FocusAction::RemoveHead
        );
        assert_eq!(PendingSignals::default().resolve(), FocusAction::Nothing);
    }

    #[tokio::test]
    async fn peek_and_clear_consumes_both_flags() {
        let pool = open_in_memory().await.unwrap();
        publish(&pool, FeedSignal::QueueReloadRequested).await.unwrap();
        publish(&pool, FeedSignal::QueueHeadRemoveRequested)
            .await
            .unwrap();
        publish(&pool, FeedSignal::QueueHeadRemoveRequested)
            .await
            .unwrap();

        assert_eq!(
            peek_and_clear(&pool).await,
            PendingSignals {
                reload: true,
                remove_top: true
            }
        );
        assert_eq!(peek_and_clear(&pool).await, PendingSignals::default());
    }

    #[tokio::test]
    async fn clear_drops_one_flag() {
        let pool = open_in_memory().await.unwrap();
        publish(&pool, FeedSignal::QueueReloadRequested).await.unwrap();
        publish(&pool, FeedSignal::QueueHeadRemoveRequested)
            .await
            .unwrap();
        clear(&pool, FeedSignal::QueueHeadRemoveRequested)
            .await
            .unwrap();

        assert_eq!(
            peek_and_clear(&pool).await,
            PendingSignals {
                reload: true,
                remove_top: false
            }
        );
    }

    #[test]
    fn parse_names() {
        assert_eq!(
            FeedSignal::parse("reload"),
            Some(FeedSignal::QueueReloadRequested)
        );
        assert_eq!(
            FeedSignal::parse(" remove-top "),
            Some(FeedSignal::QueueHeadRemoveRequested)
        );
        assert_eq!(FeedSignal::parse("skip"), None);
    }
}
