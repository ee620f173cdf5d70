pub mod collection_service;
pub mod dashboard_service;
pub mod estimate_service;
pub mod mutation_service;
pub mod navigation_service;
pub mod search_service;
pub mod sequencer;
pub mod session_service;
pub mod transaction_service;
