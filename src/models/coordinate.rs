#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSource {
    /// Obtained from a GPS fix during this load.
    Fresh,
    /// Reused from durable storage or the self-profile.
    Cached,
}

// "No coordinate" is expressed as `Option<Coordinate>::None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub source: CoordinateSource,
}

impl Coordinate {
    pub fn fresh(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            source: CoordinateSource::Fresh,
        }
    }

    pub fn cached(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            source: CoordinateSource::Cached,
        }
    }
}
