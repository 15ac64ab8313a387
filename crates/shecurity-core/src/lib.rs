pub mod app_config;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod maps;
pub mod models;
pub mod proximity;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, LocationSettings};
pub use catalog::{default_catalog, load_catalog, load_catalog_or_default, CatalogFile};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{load_app_config, load_app_config_from_env};
pub use maps::{directions_url, location_link};
pub use models::{AssistancePoint, Contact, Position, RankedAssistancePoint};
pub use proximity::{haversine_km, rank_nearest, EARTH_RADIUS_KM};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
