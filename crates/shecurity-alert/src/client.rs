//! HTTP client for the alert-delivery endpoint.
//!
//! One POST per alert, no retry. A 2xx answer must carry `{"message": ...}`,
//! which is handed back verbatim. A failure status with a readable message
//! becomes [`DispatchError::Remote`]; anything else is a transport-level error.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::DispatchError;
use crate::types::{AlertRequest, AlertResponse};

const SEND_ALERT_PATH: &str = "send-alert";

/// Anything that can deliver an [`AlertRequest`].
pub trait AlertTransport: Send + Sync {
    fn send_alert(
        &self,
        request: &AlertRequest,
    ) -> impl Future<Output = Result<AlertResponse, DispatchError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: Option<String>,
}

/// Client for the alert endpoint.
pub struct AlertClient {
    client: Client,
    endpoint: Url,
}

impl AlertClient {
    /// Creates a client that posts to `<base_url>/send-alert`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`DispatchError::InvalidUrl`] if `base_url`
    /// is not a valid URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(SEND_ALERT_PATH))
            .map_err(|e| DispatchError::InvalidUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, request: &AlertRequest) -> Result<AlertResponse, DispatchError> {
        tracing::info!(endpoint = %self.endpoint, "sending alert");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let remote_message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty());
            return Err(match remote_message {
                Some(message) => DispatchError::Remote {
                    status: status.as_u16(),
                    message,
                },
                None => DispatchError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: self.endpoint.to_string(),
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| DispatchError::Deserialize {
            context: self.endpoint.to_string(),
            source: e,
        })
    }
}

impl AlertTransport for AlertClient {
    async fn send_alert(&self, request: &AlertRequest) -> Result<AlertResponse, DispatchError> {
        self.post(request).await
    }
}
