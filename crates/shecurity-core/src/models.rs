//! Domain types shared across the workspace.

use serde::{Deserialize, Serialize};

/// A resolved geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `true` when both coordinates are finite and inside the WGS-84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// A static catalog entry: somewhere a person in distress can go for help.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistancePoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl AssistancePoint {
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

/// An [`AssistancePoint`] annotated with its distance from the current position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAssistancePoint {
    #[serde(flatten)]
    pub point: AssistancePoint,
    pub distance_km: f64,
}

/// Emergency contact details entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub email: String,
}

impl Contact {
    #[must_use]
    pub fn new(phone: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            email: email.into(),
        }
    }

    /// Both fields must be non-blank before an alert may be dispatched.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.phone.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// Phone number with all but the last two digits hidden, for log output.
    #[must_use]
    pub fn masked_phone(&self) -> String {
        let chars: Vec<char> = self.phone.trim().chars().collect();
        let keep = chars.len().min(2);
        let hidden = chars.len() - keep;
        let mut masked = "*".repeat(hidden);
        masked.extend(&chars[hidden..]);
        masked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_with_blank_phone_is_incomplete() {
        let contact = Contact::new("   ", "someone@example.com");
        assert!(!contact.is_complete());
    }

    #[test]
    fn contact_with_blank_email_is_incomplete() {
        let contact = Contact::new("+911234567890", "");
        assert!(!contact.is_complete());
    }

    #[test]
    fn contact_with_both_fields_is_complete() {
        let contact = Contact::new("+911234567890", "someone@example.com");
        assert!(contact.is_complete());
    }

    #[test]
    fn masked_phone_keeps_last_two_digits() {
        let contact = Contact::new("9876543210", "a@b.c");
        assert_eq!(contact.masked_phone(), "********10");
    }

    #[test]
    fn masked_phone_handles_short_numbers() {
        assert_eq!(Contact::new("7", "a@b.c").masked_phone(), "7");
        assert_eq!(Contact::new("", "a@b.c").masked_phone(), "");
    }

    #[test]
    fn position_rejects_out_of_range_latitude() {
        assert!(!Position::new(91.0, 0.0).is_valid());
        assert!(!Position::new(f64::NAN, 0.0).is_valid());
        assert!(Position::new(-90.0, 180.0).is_valid());
    }

    #[test]
    fn ranked_point_serializes_flat() {
        let ranked = RankedAssistancePoint {
            point: AssistancePoint {
                name: "A".to_string(),
                latitude: 1.0,
                longitude: 2.0,
            },
            distance_km: 3.5,
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["name"], "A");
        assert_eq!(json["distance_km"], 3.5);
    }
}
