use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One match candidate as ranked by the backend. Only `id` matters to the
/// feed; everything else is display payload passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    #[serde(rename = "uuid")]
    pub id: String,
    pub first_name: Option<String>,
    pub age: Option<u32>,
    pub profile_picture: Option<String>,
    pub distance_to_user: Option<f64>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
