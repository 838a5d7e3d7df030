pub mod candidate_queue;
pub mod feed_controller;
pub mod location_service;
pub mod matching_api_service;
pub mod notification_service;
pub mod search_parameter_service;
pub mod signal_service;
