//! Deep links into an external mapping service.
//!
//! Links are only generated here; opening them is left to the user.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::models::Position;

const MAPS_BASE: &str = "https://www.google.com/maps";

/// Characters left as-is inside a coordinate query value.
const COORD_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-');

fn encode_coords(position: Position) -> String {
    let raw = format!("{},{}", position.latitude, position.longitude);
    utf8_percent_encode(&raw, COORD_VALUE).to_string()
}

/// Shareable link pinning `position` on the map.
#[must_use]
pub fn location_link(position: Position) -> String {
    format!("{MAPS_BASE}?q={},{}", position.latitude, position.longitude)
}

/// Turn-by-turn directions from `origin` to `destination`.
#[must_use]
pub fn directions_url(origin: Position, destination: Position) -> String {
    format!(
        "{MAPS_BASE}/dir/?api=1&origin={}&destination={}",
        encode_coords(origin),
        encode_coords(destination)
    )
}
