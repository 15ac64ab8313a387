//! One-shot current-position queries.
//!
//! [`Geolocator`] wraps the sources this platform offers (a precise device
//! fix and a network estimate) behind [`LocationProvider`]. Every call is
//! independent: there is no retry loop, callers decide whether to ask again.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shecurity_core::{Clock, LocationSettings, Position};

use crate::error::LocationError;
use crate::network::NetworkLocator;

/// Per-query options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOptions {
    /// Prefer the device fix over a network estimate.
    pub high_accuracy: bool,
    /// Fail with [`LocationError::Timeout`] if no fix arrives in this window.
    pub timeout_ms: u64,
    /// Accept a previous fix no older than this. `0` always queries.
    pub max_age_ms: u64,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 10_000,
            max_age_ms: 0,
        }
    }
}

impl From<&LocationSettings> for LocationOptions {
    fn from(settings: &LocationSettings) -> Self {
        Self {
            high_accuracy: settings.high_accuracy,
            timeout_ms: settings.timeout_ms,
            max_age_ms: settings.max_age_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixSource {
    Device,
    Network,
}

impl std::fmt::Display for FixSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixSource::Device => write!(f, "device"),
            FixSource::Network => write!(f, "network"),
        }
    }
}

/// A single resolved position reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub position: Position,
    pub captured_at_ms: i64,
    pub source: FixSource,
}

impl Fix {
    #[must_use]
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.captured_at_ms)
    }

    /// `true` if the fix is older than `max_age_ms` at `now_ms`.
    #[must_use]
    pub fn is_stale(&self, max_age_ms: u64, now_ms: i64) -> bool {
        let max_age = i64::try_from(max_age_ms).unwrap_or(i64::MAX);
        self.age_ms(now_ms) > max_age
    }
}

/// Anything that can answer "where am I right now".
pub trait LocationProvider: Send + Sync {
    /// Resolve the current position once.
    fn current_position(
        &self,
        options: LocationOptions,
    ) -> impl Future<Output = Result<Fix, LocationError>> + Send;
}

/// The platform location subsystem.
pub struct Geolocator {
    device: Option<Position>,
    network: Option<NetworkLocator>,
    clock: Arc<dyn Clock>,
    last_fix: Mutex<Option<Fix>>,
}

impl Geolocator {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            device: None,
            network: None,
            clock,
            last_fix: Mutex::new(None),
        }
    }

    /// Use `position` as the precise device fix.
    #[must_use]
    pub fn with_device_fix(mut self, position: Position) -> Self {
        self.device = Some(position);
        self
    }

    #[must_use]
    pub fn with_network(mut self, locator: NetworkLocator) -> Self {
        self.network = Some(locator);
        self
    }

    /// Build from application settings, wiring whichever sources are configured.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] if the network locator cannot be built.
    pub fn from_settings(
        settings: &LocationSettings,
        user_agent: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LocationError> {
        let mut geolocator = Self::new(clock);
        if let Some(position) = settings.device_position {
            geolocator = geolocator.with_device_fix(position);
        }
        if let Some(url) = settings.geoip_url.as_deref() {
            let timeout = Duration::from_millis(settings.timeout_ms.max(1));
            geolocator = geolocator.with_network(NetworkLocator::new(url, timeout, user_agent)?);
        }
        Ok(geolocator)
    }

    /// `true` if at least one source is configured.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.device.is_some() || self.network.is_some()
    }

    fn source_order(high_accuracy: bool) -> [FixSource; 2] {
        if high_accuracy {
            [FixSource::Device, FixSource::Network]
        } else {
            [FixSource::Network, FixSource::Device]
        }
    }

    fn cached_fix(&self, max_age_ms: u64) -> Option<Fix> {
        if max_age_ms == 0 {
            return None;
        }
        let now = self.clock.now_epoch_ms();
        let cached = *self.last_fix.lock().ok()?;
        cached.filter(|fix| !fix.is_stale(max_age_ms, now))
    }

    fn remember(&self, fix: Fix) {
        if let Ok(mut guard) = self.last_fix.lock() {
            *guard = Some(fix);
        }
    }

    async fn query_sources(&self, high_accuracy: bool) -> Result<Fix, LocationError> {
        let mut last_err = LocationError::Unavailable;
        for source in Self::source_order(high_accuracy) {
            let attempt = match source {
                FixSource::Device => match self.device {
                    Some(position) => Ok(position),
                    None => continue,
                },
                FixSource::Network => match &self.network {
                    Some(locator) => locator.locate().await,
                    None => continue,
                },
            };
            match attempt.and_then(checked) {
                Ok(position) => {
                    return Ok(Fix {
                        position,
                        captured_at_ms: self.clock.now_epoch_ms(),
                        source,
                    })
                }
                Err(err) => {
                    tracing::warn!(%source, error = %err, "location source failed");
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }
}

/// Reject readings that are not finite or fall outside WGS-84 ranges.
fn checked(position: Position) -> Result<Position, LocationError> {
    if position.is_valid() {
        Ok(position)
    } else {
        Err(LocationError::PositionUnavailable(format!(
            "coordinates out of range: {position}"
        )))
    }
}

impl LocationProvider for Geolocator {
    async fn current_position(&self, options: LocationOptions) -> Result<Fix, LocationError> {
        if !self.is_supported() {
            return Err(LocationError::Unavailable);
        }
        if let Some(fix) = self.cached_fix(options.max_age_ms) {
            tracing::debug!(source = %fix.source, "reusing cached location fix");
            return Ok(fix);
        }

        let window = Duration::from_millis(options.timeout_ms);
        let fix = tokio::time::timeout(window, self.query_sources(options.high_accuracy))
            .await
            .map_err(|_| LocationError::Timeout {
                timeout_ms: options.timeout_ms,
            })??;

        tracing::debug!(source = %fix.source, "location fix acquired");
        self.remember(fix);
        Ok(fix)
    }
}
