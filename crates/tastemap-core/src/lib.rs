//! Provider-independent domain logic: place records, ranking, comparison
//! and configuration.

pub mod app_config;
pub mod comparison;
pub mod config;
pub mod constraints;
pub mod error;
pub mod geo;
pub mod keyword;
pub mod place;
pub mod ranking;
pub mod scoring;

pub use app_config::{AppConfig, Environment, Transport};
pub use comparison::{ComparisonEntry, ComparisonRow, MAX_BATCH_IDS};
pub use config::{load_app_config, load_app_config_from_env, parse_transport};
pub use constraints::{PriceRange, SearchConstraints, SortKey};
pub use error::{ConfigError, ValidationError};
pub use place::{Coordinates, Engagement, PlaceRecord, PriceLevel, Promotions, Ratings};
pub use ranking::rank;
