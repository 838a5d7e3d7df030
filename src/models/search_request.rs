use serde::{Deserialize, Serialize};

use super::{CandidateRecord, Coordinate, SearchParameters, SelfProfile, SortMode};

/// Body of `POST search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub distance: u32,
    pub show_outside_parameters: bool,
    pub sort: SortMode,
    pub latitude: f64,
    pub longitude: f64,
    pub misc_infos: Vec<i64>,
    pub intentions: Vec<i64>,
    pub interests: Vec<i64>,
    pub preferred_gender_ids: Vec<i64>,
}

impl SearchRequest {
    /// Stored filters win; the profile's preferred genders fill in when the
    /// stored parameters carry no gender filter.
    pub fn build(
        params: &SearchParameters,
        coordinate: &Coordinate,
        profile: Option<&SelfProfile>,
    ) -> Self {
        let preferred_gender_ids = if params.gender_filter.is_empty() {
            profile
                .map(SelfProfile::preferred_gender_ids)
                .unwrap_or_default()
        } else {
            params.gender_filter.iter().copied().collect()
        };

        Self {
            distance: params.distance_radius,
            show_outside_parameters: params.show_outside_parameters,
            sort: params.sort_mode,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            misc_infos: params.misc_info_filter.iter().copied().collect(),
            intentions: params.intention_filter.iter().copied().collect(),
            interests: params.interest_filter.iter().copied().collect(),
            preferred_gender_ids,
        }
    }
}

/// Body returned by `POST search`. A missing `users` list means no candidates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub users: Option<Vec<CandidateRecord>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenderRef;
    use pretty_assertions::assert_eq;

    fn profile_with_genders(ids: &[i64]) -> SelfProfile {
        SelfProfile {
            preferred_genders: ids
                .iter()
                .map(|id| GenderRef { id: *id, text: None })
                .collect(),
            ..SelfProfile::default()
        }
    }

    #[test]
    fn profile_genders_fill_empty_filter() {
        let params = SearchParameters::default();
        let coordinate = Coordinate::fresh(52.1, 4.3);
        let request =
            SearchRequest::build(&params, &coordinate, Some(&profile_with_genders(&[1, 2])));

        assert_eq!(request.preferred_gender_ids, vec![1, 2]);
        assert_eq!(request.latitude, 52.1);
        assert_eq!(request.sort, SortMode::Default);
    }

    #[test]
    fn stored_gender_filter_wins() {
        let mut params = SearchParameters::default();
        params.gender_filter.insert(3);
        let request = SearchRequest::build(
            &params,
            &Coordinate::cached(0.0, 0.0),
            Some(&profile_with_genders(&[1])),
        );
        assert_eq!(request.preferred_gender_ids, vec![3]);
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let request =
            SearchRequest::build(&SearchParameters::default(), &Coordinate::cached(1.0, 2.0), None);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["sort"], serde_json::json!(7));
        assert_eq!(value["showOutsideParameters"], serde_json::json!(true));
        assert_eq!(value["preferredGenderIds"], serde_json::json!([]));
        assert_eq!(value["miscInfos"], serde_json::json!([]));
    }
}
