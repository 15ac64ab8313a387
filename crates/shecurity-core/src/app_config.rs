use std::path::PathBuf;

use crate::models::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How the current position is acquired.
#[derive(Clone)]
pub struct LocationSettings {
    /// Prefer the precise device fix over a network estimate.
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    /// `0` forces a fresh fix on every query.
    pub max_age_ms: u64,
    pub device_position: Option<Position>,
    pub geoip_url: Option<String>,
}

impl std::fmt::Debug for LocationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSettings")
            .field("high_accuracy", &self.high_accuracy)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_age_ms", &self.max_age_ms)
            .field(
                "device_position",
                &self.device_position.as_ref().map(|_| "[redacted]"),
            )
            .field("geoip_url", &self.geoip_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub alert_url: String,
    pub alert_timeout_secs: u64,
    pub alert_include_email: bool,
    pub user_agent: String,
    pub stations_path: PathBuf,
    pub state_path: PathBuf,
    pub credential_ttl_hours: u64,
    pub nearest_limit: usize,
    pub location: LocationSettings,
    pub speech_language: String,
}
