use thiserror::Error;

/// Errors returned while delivering an alert.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Network or TLS failure reaching the alert endpoint.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a failure status and a message of its own.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// The endpoint answered with a failure status and no readable message.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid alert endpoint '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl DispatchError {
    /// `true` when the endpoint was reached and reported the failure itself.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, DispatchError::Remote { .. })
    }
}
