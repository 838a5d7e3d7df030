pub mod candidate;
pub mod coordinate;
pub mod search_parameters;
pub mod search_request;
pub mod self_profile;

pub use candidate::CandidateRecord;
pub use coordinate::{Coordinate, CoordinateSource};
pub use search_parameters::{DistanceUnit, SearchParameters, SortMode};
pub use search_request::{SearchRequest, SearchResponse};
pub use self_profile::{GenderRef, SelfProfile, SelfProfileResource};
