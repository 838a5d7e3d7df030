use std::env;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://feed.db";
pub const DEFAULT_MATCHING_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_GPS_TIMEOUT_MS: u64 = 10_000;

/// Runtime settings for the feed binaries, read from the process environment
/// (after `.env` has been loaded).
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub database_url: String,
    pub api_base_url: String,
    pub api_token: Option<String>,
    /// SHORT acquisition timeout; LONG is derived from it.
    pub gps_timeout_short: Duration,
    pub device: DeviceSimulation,
}

/// What the driver binary reports as "the device" when asked for permission
/// and a position fix.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSimulation {
    pub permission_granted: bool,
    pub position: Option<(f64, f64)>,
}

impl FeedConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let api_base_url =
            env::var("MATCHING_API_URL").unwrap_or_else(|_| DEFAULT_MATCHING_API_URL.to_string());
        let api_token = env::var("MATCHING_API_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let gps_timeout_ms: u64 = env::var("FEED_GPS_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_GPS_TIMEOUT_MS);

        Self {
            database_url,
            api_base_url,
            api_token,
            gps_timeout_short: Duration::from_millis(gps_timeout_ms),
            device: DeviceSimulation::from_env(),
        }
    }
}

impl DeviceSimulation {
    fn from_env() -> Self {
        let permission_granted = env::var("FEED_LOCATION_PERMISSION")
            .map(|v| parse_permission(&v))
            .unwrap_or(false);
        let latitude = env::var("FEED_DEVICE_LATITUDE")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok());
        let longitude = env::var("FEED_DEVICE_LONGITUDE")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok());

        Self {
            permission_granted,
            position: latitude.zip(longitude),
        }
    }
}

fn parse_permission(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "granted" | "true" | "yes" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_values() {
        assert!(parse_permission("granted"));
        assert!(parse_permission(" TRUE "));
        assert!(!parse_permission("denied"));
        assert!(!parse_permission(""));
    }
}
