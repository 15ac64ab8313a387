use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "SHECURITY_ENV"));
}

#[test]
fn build_app_config_uses_defaults_with_empty_env() {
    let map = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.alert_url, "http://localhost:5000");
    assert_eq!(cfg.alert_timeout_secs, 30);
    assert!(!cfg.alert_include_email);
    assert_eq!(cfg.user_agent, "shecurity/0.1 (emergency-alert)");
    assert_eq!(
        cfg.stations_path.to_string_lossy(),
        "./config/stations.yaml"
    );
    assert_eq!(
        cfg.state_path.to_string_lossy(),
        "./.shecurity/credentials.json"
    );
    assert_eq!(cfg.credential_ttl_hours, 24);
    assert_eq!(cfg.nearest_limit, 5);
    assert!(cfg.location.high_accuracy);
    assert_eq!(cfg.location.timeout_ms, 10_000);
    assert_eq!(cfg.location.max_age_ms, 0);
    assert!(cfg.location.device_position.is_none());
    assert!(cfg.location.geoip_url.is_none());
    assert_eq!(cfg.speech_language, "en-US");
}

#[test]
fn alert_url_override() {
    let mut map = HashMap::new();
    map.insert("SHECURITY_ALERT_URL", "https://alerts.example.org");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.alert_url, "https://alerts.example.org");
}

#[test]
fn blank_alert_url_is_rejected() {
    let mut map = HashMap::new();
    map.insert("SHECURITY_ALERT_URL", "  ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHECURITY_ALERT_URL"),
        "expected InvalidEnvVar(SHECURITY_ALERT_URL), got: {result:?}"
    );
}

#[test]
fn alert_timeout_secs_invalid() {
    let mut map = HashMap::new();
    map.insert("SHECURITY_ALERT_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHECURITY_ALERT_TIMEOUT_SECS"),
        "expected InvalidEnvVar(SHECURITY_ALERT_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn include_email_accepts_common_boolean_spellings() {
    for raw in ["true", "TRUE", "1", "yes", "on"] {
        let mut map = HashMap::new();
        map.insert("SHECURITY_ALERT_INCLUDE_EMAIL", raw);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.alert_include_email, "'{raw}' should parse as true");
    }
}

#[test]
fn include_email_rejects_garbage() {
    let mut map = HashMap::new();
    map.insert("SHECURITY_ALERT_INCLUDE_EMAIL", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHECURITY_ALERT_INCLUDE_EMAIL"),
        "expected InvalidEnvVar(SHECURITY_ALERT_INCLUDE_EMAIL), got: {result:?}"
    );
}

#[test]
fn credential_ttl_hours_override() {
    let mut map = HashMap::new();
    map.insert("SHECURITY_CREDENTIAL_TTL_HOURS", "2");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.credential_ttl_hours, 2);
}

#[test]
fn nearest_limit_invalid() {
    let mut map = HashMap::new();
    map.insert("SHECURITY_NEAREST_LIMIT", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHECURITY_NEAREST_LIMIT"),
        "expected InvalidEnvVar(SHECURITY_NEAREST_LIMIT), got: {result:?}"
    );
}

#[test]
fn location_settings_override() {
    let mut map = HashMap::new();
    map.insert("SHECURITY_LOCATION_HIGH_ACCURACY", "false");
    map.insert("SHECURITY_LOCATION_TIMEOUT_MS", "2500");
    map.insert("SHECURITY_LOCATION_MAX_AGE_MS", "60000");
    map.insert("SHECURITY_GEOIP_URL", "https://geo.example.org/json");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(!cfg.location.high_accuracy);
    assert_eq!(cfg.location.timeout_ms, 2500);
    assert_eq!(cfg.location.max_age_ms, 60_000);
    assert_eq!(
        cfg.location.geoip_url.as_deref(),
        Some("https://geo.example.org/json")
    );
}

#[test]
fn device_position_requires_both_coordinates() {
    let mut map = HashMap::new();
    map.insert("SHECURITY_DEVICE_LATITUDE", "28.6");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHECURITY_DEVICE_LONGITUDE"),
        "expected InvalidEnvVar(SHECURITY_DEVICE_LONGITUDE), got: {result:?}"
    );
}

#[test]
fn device_position_parses_pair() {
    let mut map = HashMap::new();
    map.insert("SHECURITY_DEVICE_LATITUDE", "28.6139");
    map.insert("SHECURITY_DEVICE_LONGITUDE", " 77.2090 ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.location.device_position,
        Some(Position::new(28.6139, 77.2090))
    );
}

#[test]
fn device_position_out_of_range_is_rejected() {
    let mut map = HashMap::new();
    map.insert("SHECURITY_DEVICE_LATITUDE", "128.0");
    map.insert("SHECURITY_DEVICE_LONGITUDE", "77.0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHECURITY_DEVICE_LATITUDE"),
        "expected InvalidEnvVar(SHECURITY_DEVICE_LATITUDE), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_device_position() {
    let mut map = HashMap::new();
    map.insert("SHECURITY_DEVICE_LATITUDE", "28.6139");
    map.insert("SHECURITY_DEVICE_LONGITUDE", "77.2090");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("28.6139"), "leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}
