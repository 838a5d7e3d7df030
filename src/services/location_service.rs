use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::DeviceSimulation;
use crate::database::feed_storage_repo;
use crate::error::LocationError;
use crate::models::Coordinate;

/// LONG acquisition timeout is this multiple of SHORT.
pub const LONG_TIMEOUT_FACTOR: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// The platform location service.
#[async_trait]
pub trait DeviceLocation: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;

    /// Requests a single position fix. `cancel` fires when the caller stops
    /// waiting; implementations should release the underlying request then.
    /// `None` means the device could not produce a fix.
    async fn current_position(&self, cancel: CancellationToken) -> Option<DevicePosition>;
}

pub struct LocationResolver {
    device: Arc<dyn DeviceLocation>,
    short_timeout: Duration,
}

impl LocationResolver {
    pub fn new(device: Arc<dyn DeviceLocation>, short_timeout: Duration) -> Self {
        Self {
            device,
            short_timeout,
        }
    }

    /// Asks for permission, then races a GPS fix against the adaptive timeout.
    /// When the timer wins the fix request is cancelled.
    pub async fn resolve(
        &self,
        has_cached_coordinate: bool,
        timeout_override: Option<Duration>,
    ) -> Result<Coordinate, LocationError> {
        if self.device.request_permission().await != PermissionStatus::Granted {
            return Err(LocationError::PermissionDenied);
        }

        let timeout =
            acquisition_timeout(self.short_timeout, has_cached_coordinate, timeout_override);
        let cancel = CancellationToken::new();

        let fix = tokio::select! {
            fix = self.device.current_position(cancel.clone()) => fix,
            _ = tokio::time::sleep(timeout) => {
                cancel.cancel();
                debug!("📍 No GPS fix within {:?}, request cancelled", timeout);
                None
            }
        };

        let position = fix.ok_or(LocationError::SignalUnavailable)?;
        Ok(Coordinate::fresh(position.latitude, position.longitude))
    }
}

/// SHORT when a cached coordinate exists, LONG otherwise; an override can
/// only raise the result.
pub fn acquisition_timeout(
    short: Duration,
    has_cached_coordinate: bool,
    timeout_override: Option<Duration>,
) -> Duration {
    let base = if has_cached_coordinate {
        short
    } else {
        short * LONG_TIMEOUT_FACTOR
    };
    match timeout_override {
        Some(value) => base.max(value),
        None => base,
    }
}

/// Last persisted coordinate. Missing or unparseable halves count as absent.
pub async fn load_cached_coordinate(pool: &SqlitePool) -> Option<Coordinate> {
    let lat = read_number(pool, feed_storage_repo::KEY_LATITUDE).await;
    let lon = read_number(pool, feed_storage_repo::KEY_LONGITUDE).await;
    lat.zip(lon).map(|(lat, lon)| Coordinate::cached(lat, lon))
}

pub async fn persist_coordinate(pool: &SqlitePool, coordinate: &Coordinate) -> sqlx::Result<()> {
    feed_storage_repo::set_value(
        pool,
        feed_storage_repo::KEY_LATITUDE,
        &coordinate.latitude.to_string(),
    )
    .await?;
    feed_storage_repo::set_value(
        pool,
        feed_storage_repo::KEY_LONGITUDE,
        &coordinate.longitude.to_string(),
    )
    .await
}

async fn read_number(pool: &SqlitePool, key: &str) -> Option<f64> {
    match feed_storage_repo::get_value(pool, key).await {
        Ok(raw) => raw
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite()),
        Err(e) => {
            warn!("📍 Reading {} failed: {}", key, e);
            None
        }
    }
}

/// Device backed by fixed settings, used by the driver binary. Without a
/// configured position the fix never arrives and the request waits for
/// cancellation.
pub struct StaticDeviceLocation {
    settings: DeviceSimulation,
}

impl StaticDeviceLocation {
    pub fn new(settings: DeviceSimulation) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl DeviceLocation for StaticDeviceLocation {
    async fn request_permission(&self) -> PermissionStatus {
        if self.settings.permission_granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn current_position(&self, cancel: CancellationToken) -> Option<DevicePosition> {
        match self.settings.position {
            Some((latitude, longitude)) => Some(DevicePosition {
                latitude,
                longitude,
            }),
            None => {
                cancel.cancelled().await;
                None
            }
        }
    }
}
