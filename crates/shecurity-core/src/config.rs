use crate::app_config::{AppConfig, Environment, LocationSettings};
use crate::models::Position;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let parse_coord = |var: &str| -> Result<Option<f64>, ConfigError> {
        lookup(var)
            .ok()
            .map(|raw| raw.trim().parse::<f64>().map_err(|e| invalid(var, e.to_string())))
            .transpose()
    };

    let env = parse_environment(&or_default("SHECURITY_ENV", "development"))?;
    let log_level = or_default("SHECURITY_LOG_LEVEL", "info");

    let alert_url = or_default("SHECURITY_ALERT_URL", "http://localhost:5000");
    if alert_url.trim().is_empty() {
        return Err(invalid("SHECURITY_ALERT_URL", "must be non-empty".to_string()));
    }
    let alert_timeout_secs = parse_u64("SHECURITY_ALERT_TIMEOUT_SECS", "30")?;
    let alert_include_email = parse_bool("SHECURITY_ALERT_INCLUDE_EMAIL", "false")?;
    let user_agent = or_default("SHECURITY_USER_AGENT", "shecurity/0.1 (emergency-alert)");

    let stations_path = PathBuf::from(or_default(
        "SHECURITY_STATIONS_PATH",
        "./config/stations.yaml",
    ));
    let state_path = PathBuf::from(or_default(
        "SHECURITY_STATE_PATH",
        "./.shecurity/credentials.json",
    ));
    let credential_ttl_hours = parse_u64("SHECURITY_CREDENTIAL_TTL_HOURS", "24")?;
    let nearest_limit = parse_usize("SHECURITY_NEAREST_LIMIT", "5")?;

    let high_accuracy = parse_bool("SHECURITY_LOCATION_HIGH_ACCURACY", "true")?;
    let timeout_ms = parse_u64("SHECURITY_LOCATION_TIMEOUT_MS", "10000")?;
    let max_age_ms = parse_u64("SHECURITY_LOCATION_MAX_AGE_MS", "0")?;

    let device_position = match (
        parse_coord("SHECURITY_DEVICE_LATITUDE")?,
        parse_coord("SHECURITY_DEVICE_LONGITUDE")?,
    ) {
        (Some(latitude), Some(longitude)) => {
            let position = Position::new(latitude, longitude);
            if !position.is_valid() {
                return Err(invalid(
                    "SHECURITY_DEVICE_LATITUDE",
                    format!("coordinates out of range: {position}"),
                ));
            }
            Some(position)
        }
        (None, None) => None,
        (Some(_), None) => {
            return Err(invalid(
                "SHECURITY_DEVICE_LONGITUDE",
                "must be set together with SHECURITY_DEVICE_LATITUDE".to_string(),
            ))
        }
        (None, Some(_)) => {
            return Err(invalid(
                "SHECURITY_DEVICE_LATITUDE",
                "must be set together with SHECURITY_DEVICE_LONGITUDE".to_string(),
            ))
        }
    };
    let geoip_url = lookup("SHECURITY_GEOIP_URL")
        .ok()
        .filter(|url| !url.trim().is_empty());

    let speech_language = or_default("SHECURITY_SPEECH_LANGUAGE", "en-US");

    Ok(AppConfig {
        env,
        log_level,
        alert_url,
        alert_timeout_secs,
        alert_include_email,
        user_agent,
        stations_path,
        state_path,
        credential_ttl_hours,
        nearest_limit,
        location: LocationSettings {
            high_accuracy,
            timeout_ms,
            max_age_ms,
            device_position,
            geoip_url,
        },
        speech_language,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHECURITY_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
