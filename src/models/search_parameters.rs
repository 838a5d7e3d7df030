use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub const DEFAULT_DISTANCE: u32 = 50;
pub const DEFAULT_SHOW_OUTSIDE_PARAMETERS: bool = true;

/// Ordering the backend applies to the result list. Wire values are the
/// backend's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SortMode {
    Distance,
    ActiveDate,
    Interest,
    DonationLatest,
    DonationTotal,
    NewestUser,
    #[default]
    Default,
}

impl From<SortMode> for u8 {
    fn from(mode: SortMode) -> u8 {
        match mode {
            SortMode::Distance => 1,
            SortMode::ActiveDate => 2,
            SortMode::Interest => 3,
            SortMode::DonationLatest => 4,
            SortMode::DonationTotal => 5,
            SortMode::NewestUser => 6,
            SortMode::Default => 7,
        }
    }
}

impl TryFrom<u8> for SortMode {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(SortMode::Distance),
            2 => Ok(SortMode::ActiveDate),
            3 => Ok(SortMode::Interest),
            4 => Ok(SortMode::DonationLatest),
            5 => Ok(SortMode::DonationTotal),
            6 => Ok(SortMode::NewestUser),
            7 => Ok(SortMode::Default),
            other => Err(format!("unknown sort mode {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
}

impl From<DistanceUnit> for u8 {
    fn from(unit: DistanceUnit) -> u8 {
        match unit {
            DistanceUnit::Kilometers => 0,
            DistanceUnit::Miles => 1,
        }
    }
}

impl TryFrom<u8> for DistanceUnit {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DistanceUnit::Kilometers),
            1 => Ok(DistanceUnit::Miles),
            other => Err(format!("unknown distance unit {}", other)),
        }
    }
}

/// Durable search filters written by the settings screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    #[serde(rename = "distance")]
    pub distance_radius: u32,
    pub distance_unit: DistanceUnit,
    #[serde(rename = "sort")]
    pub sort_mode: SortMode,
    pub show_outside_parameters: bool,
    #[serde(rename = "preferredGenderIds")]
    pub gender_filter: BTreeSet<i64>,
    #[serde(rename = "interests")]
    pub interest_filter: BTreeSet<i64>,
    #[serde(rename = "intentions")]
    pub intention_filter: BTreeSet<i64>,
    #[serde(rename = "miscInfos")]
    pub misc_info_filter: BTreeSet<i64>,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            distance_radius: DEFAULT_DISTANCE,
            distance_unit: DistanceUnit::default(),
            sort_mode: SortMode::default(),
            show_outside_parameters: DEFAULT_SHOW_OUTSIDE_PARAMETERS,
            gender_filter: BTreeSet::new(),
            interest_filter: BTreeSet::new(),
            intention_filter: BTreeSet::new(),
            misc_info_filter: BTreeSet::new(),
        }
    }
}

impl SearchParameters {
    /// Decodes the stored blob field by field. A missing blob, a blob that is
    /// not a JSON object, or any single field that is missing or malformed
    /// falls back to the default for that field only.
    pub fn from_stored(raw: Option<&str>) -> Self {
        let defaults = Self::default();
        let Some(obj) = raw
            .and_then(|s| serde_json::from_str::<Value>(s).ok())
            .and_then(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
        else {
            return defaults;
        };

        Self {
            distance_radius: field(&obj, "distance")
                .filter(|d: &u32| *d > 0)
                .unwrap_or(defaults.distance_radius),
            distance_unit: field(&obj, "distanceUnit").unwrap_or(defaults.distance_unit),
            sort_mode: field(&obj, "sort").unwrap_or(defaults.sort_mode),
            show_outside_parameters: field(&obj, "showOutsideParameters")
                .unwrap_or(defaults.show_outside_parameters),
            gender_filter: field(&obj, "preferredGenderIds").unwrap_or(defaults.gender_filter),
            interest_filter: field(&obj, "interests").unwrap_or(defaults.interest_filter),
            intention_filter: field(&obj, "intentions").unwrap_or(defaults.intention_filter),
            misc_info_filter: field(&obj, "miscInfos").unwrap_or(defaults.misc_info_filter),
        }
    }
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, name: &str) -> Option<T> {
    obj.get(name)
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_blob_yields_defaults() {
        assert_eq!(SearchParameters::from_stored(None), SearchParameters::default());
        assert_eq!(
            SearchParameters::from_stored(Some("not json")),
            SearchParameters::default()
        );
        assert_eq!(
            SearchParameters::from_stored(Some("[1,2]")),
            SearchParameters::default()
        );
    }

    #[test]
    fn malformed_fields_fall_back_individually() {
        let raw = r#"{
            "distance": "far",
            "showOutsideParameters": false,
            "sort": 99,
            "distanceUnit": 1,
            "interests": [3, 1, 3]
        }"#;

        let params = SearchParameters::from_stored(Some(raw));
        assert_eq!(params.distance_radius, DEFAULT_DISTANCE);
        assert!(!params.show_outside_parameters);
        assert_eq!(params.sort_mode, SortMode::Default);
        assert_eq!(params.distance_unit, DistanceUnit::Miles);
        assert_eq!(params.interest_filter, BTreeSet::from([1, 3]));
        assert!(params.gender_filter.is_empty());
    }

    #[test]
    fn zero_distance_uses_default() {
        let params = SearchParameters::from_stored(Some(r#"{"distance": 0}"#));
        assert_eq!(params.distance_radius, DEFAULT_DISTANCE);
    }

    #[test]
    fn serialized_form_reads_back() {
        let mut params = SearchParameters::default();
        params.distance_radius = 120;
        params.sort_mode = SortMode::NewestUser;
        params.gender_filter.insert(2);

        let raw = serde_json::to_string(&params).unwrap();
        assert!(raw.contains(r#""sort":6"#));
        assert_eq!(SearchParameters::from_stored(Some(&raw)), params);
    }
}
