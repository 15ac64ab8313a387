use thiserror::Error;

/// Errors returned while acquiring the current position.
#[derive(Debug, Error)]
pub enum LocationError {
    /// No location source is configured on this platform.
    #[error("location is not supported on this device")]
    Unavailable,

    /// A source refused to disclose the position.
    #[error("location permission denied: {0}")]
    PermissionDenied(String),

    /// No fix arrived within the configured window.
    #[error("timed out after {timeout_ms} ms waiting for a location fix")]
    Timeout { timeout_ms: u64 },

    /// A source answered but could not produce a usable fix.
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    /// Network or TLS failure talking to a network location source.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The network source's body could not be deserialized.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LocationError {
    /// `true` when the platform has no location capability at all, as
    /// opposed to a capability that exists but failed this time.
    #[must_use]
    pub fn is_capability_missing(&self) -> bool {
        matches!(self, LocationError::Unavailable)
    }
}
