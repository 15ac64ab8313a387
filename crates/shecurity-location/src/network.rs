//! Network (IP-geolocation) position estimates.
//!
//! Issues a single GET against a JSON geolocation endpoint and reads the
//! coordinates from the body. Both `latitude`/`longitude` and `lat`/`lon`
//! field spellings are accepted, which covers the common free providers.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use shecurity_core::Position;

use crate::error::LocationError;

#[derive(Debug, Deserialize)]
struct GeoIpBody {
    #[serde(alias = "lat")]
    latitude: Option<f64>,
    #[serde(alias = "lon")]
    longitude: Option<f64>,
    status: Option<String>,
    #[serde(alias = "reason")]
    message: Option<String>,
}

/// Client for a network location endpoint.
pub struct NetworkLocator {
    client: Client,
    url: Url,
}

impl NetworkLocator {
    /// Creates a locator that queries `url`.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`LocationError::PositionUnavailable`] if
    /// `url` is not a valid URL.
    pub fn new(url: &str, timeout: Duration, user_agent: &str) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let url = Url::parse(url).map_err(|e| {
            LocationError::PositionUnavailable(format!("invalid geolocation URL '{url}': {e}"))
        })?;
        Ok(Self { client, url })
    }

    /// Queries the endpoint once.
    ///
    /// # Errors
    ///
    /// - [`LocationError::PermissionDenied`] on HTTP 401/403.
    /// - [`LocationError::Http`] on network failure or any other non-2xx status.
    /// - [`LocationError::Deserialize`] if the body is not JSON.
    /// - [`LocationError::PositionUnavailable`] if the body reports failure or
    ///   carries missing or out-of-range coordinates.
    pub async fn locate(&self) -> Result<Position, LocationError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied(format!(
                "geolocation endpoint returned {status}"
            )));
        }
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let parsed: GeoIpBody =
            serde_json::from_str(&body).map_err(|e| LocationError::Deserialize {
                context: self.url.to_string(),
                source: e,
            })?;
        Self::position_from_body(parsed)
    }

    fn position_from_body(body: GeoIpBody) -> Result<Position, LocationError> {
        if body
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("fail"))
        {
            return Err(LocationError::PositionUnavailable(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }
        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => {
                let position = Position::new(latitude, longitude);
                if position.is_valid() {
                    Ok(position)
                } else {
                    Err(LocationError::PositionUnavailable(format!(
                        "coordinates out of range: {position}"
                    )))
                }
            }
            _ => Err(LocationError::PositionUnavailable(
                body.message
                    .unwrap_or_else(|| "response carried no coordinates".to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> GeoIpBody {
        serde_json::from_str(json).expect("fixture should parse")
    }

    #[test]
    fn reads_long_field_names() {
        let position =
            NetworkLocator::position_from_body(body(r#"{"latitude": 28.6, "longitude": 77.2}"#))
                .unwrap();
        assert_eq!(position, Position::new(28.6, 77.2));
    }

    #[test]
    fn reads_short_field_names() {
        let position = NetworkLocator::position_from_body(body(
            r#"{"status": "success", "lat": -33.9, "lon": 151.2}"#,
        ))
        .unwrap();
        assert_eq!(position, Position::new(-33.9, 151.2));
    }

    #[test]
    fn failed_status_surfaces_message() {
        let err = NetworkLocator::position_from_body(body(
            r#"{"status": "fail", "message": "reserved range"}"#,
        ))
        .unwrap_err();
        assert!(
            matches!(err, LocationError::PositionUnavailable(ref m) if m == "reserved range"),
            "got {err:?}"
        );
    }

    #[test]
    fn missing_coordinates_are_unavailable() {
        let err =
            NetworkLocator::position_from_body(body(r#"{"error": true, "reason": "RateLimited"}"#))
                .unwrap_err();
        assert!(
            matches!(err, LocationError::PositionUnavailable(ref m) if m == "RateLimited"),
            "got {err:?}"
        );
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let err =
            NetworkLocator::position_from_body(body(r#"{"latitude": 100.0, "longitude": 0.0}"#))
                .unwrap_err();
        assert!(matches!(err, LocationError::PositionUnavailable(_)));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let result = NetworkLocator::new("not a url", Duration::from_secs(1), "test");
        assert!(matches!(result, Err(LocationError::PositionUnavailable(_))));
    }
}
