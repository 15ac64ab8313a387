use serde::{Deserialize, Serialize};
use shecurity_core::{Contact, Position};

/// Body of the outbound alert request.
///
/// `email` is only serialized when set, so the default body is the
/// `{phone, latitude, longitude}` shape every endpoint accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRequest {
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl AlertRequest {
    #[must_use]
    pub fn new(contact: &Contact, position: Position, include_email: bool) -> Self {
        Self {
            phone: contact.phone.trim().to_string(),
            email: include_email.then(|| contact.email.trim().to_string()),
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }
}

/// Body returned by the alert endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlertResponse {
    pub message: String,
}
