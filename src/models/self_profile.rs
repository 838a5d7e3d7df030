use serde::Deserialize;

use super::Coordinate;

/// Body of `GET self-profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct SelfProfileResource {
    pub user: SelfProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfProfile {
    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,
    // Backend spelling.
    #[serde(default, rename = "preferedGenders")]
    pub preferred_genders: Vec<GenderRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenderRef {
    pub id: i64,
    #[serde(default)]
    pub text: Option<String>,
}

impl SelfProfile {
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.location_latitude
            .zip(self.location_longitude)
            .map(|(lat, lon)| Coordinate::cached(lat, lon))
    }

    pub fn preferred_gender_ids(&self) -> Vec<i64> {
        self.preferred_genders.iter().map(|g| g.id).collect()
    }
}
