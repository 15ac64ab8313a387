//! Wiring from `AppConfig` to the runtime pieces each command needs.

use std::sync::Arc;

use anyhow::Context;
use shecurity_alert::AlertClient;
use shecurity_core::{AppConfig, AssistancePoint, Position, SystemClock};
use shecurity_location::Geolocator;
use shecurity_session::{CredentialCache, FileStore, Session, SessionSettings};

pub(crate) type CliSession = Session<Geolocator, AlertClient>;

pub(crate) fn credential_cache(config: &AppConfig) -> CredentialCache {
    CredentialCache::new(
        Arc::new(FileStore::new(&config.state_path)),
        Arc::new(SystemClock),
    )
}

/// Build the geolocator, letting `device` replace the configured device fix.
pub(crate) fn geolocator(
    config: &AppConfig,
    device: Option<Position>,
) -> anyhow::Result<Geolocator> {
    let mut settings = config.location.clone();
    if device.is_some() {
        settings.device_position = device;
    }
    Ok(Geolocator::from_settings(
        &settings,
        &config.user_agent,
        Arc::new(SystemClock),
    )?)
}

pub(crate) fn catalog(config: &AppConfig) -> anyhow::Result<Vec<AssistancePoint>> {
    let catalog = shecurity_core::load_catalog_or_default(&config.stations_path)
        .with_context(|| {
            format!(
                "loading station catalog from {}",
                config.stations_path.display()
            )
        })?;
    tracing::debug!(stations = catalog.stations.len(), "catalog loaded");
    Ok(catalog.stations)
}

pub(crate) fn session(config: &AppConfig, device: Option<Position>) -> anyhow::Result<CliSession> {
    let client = AlertClient::new(
        &config.alert_url,
        config.alert_timeout_secs,
        &config.user_agent,
    )
    .context("building alert client")?;
    Ok(Session::new(
        Arc::new(geolocator(config, device)?),
        client,
        credential_cache(config),
        catalog(config)?,
        SessionSettings::from(config),
    ))
}
