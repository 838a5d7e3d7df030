use tracing::warn;

use crate::error::LocationError;

/// One-shot user-facing notices raised by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedNotice {
    NoLocationPermission,
    NoLocationSignal,
}

impl FeedNotice {
    pub fn message(self) -> &'static str {
        match self {
            FeedNotice::NoLocationPermission => {
                "Location permission is off; showing results near your last known location."
            }
            FeedNotice::NoLocationSignal => {
                "No GPS signal; showing results near your last known location."
            }
        }
    }
}

impl From<LocationError> for FeedNotice {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::PermissionDenied => FeedNotice::NoLocationPermission,
            LocationError::SignalUnavailable => FeedNotice::NoLocationSignal,
        }
    }
}

/// Fire-and-forget toast channel.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: FeedNotice);
}

/// Notifier that writes notices to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: FeedNotice) {
        warn!("🔔 {}", notice.message());
    }
}
