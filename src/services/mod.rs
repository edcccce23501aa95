pub mod metadata;
pub mod providers;
pub mod recommendations;
pub mod titles;

pub use metadata::MetadataGateway;
pub use recommendations::{EngineSettings, RecommendationEngine};
