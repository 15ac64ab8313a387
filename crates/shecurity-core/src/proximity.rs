//! Great-circle proximity ranking of assistance points.
//!
//! Distances use the haversine formula on a sphere of radius
//! [`EARTH_RADIUS_KM`]. Inputs are decimal degrees.

use crate::models::{AssistancePoint, Position, RankedAssistancePoint};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two positions in kilometres.
#[must_use]
pub fn haversine_km(a: Position, b: Position) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `h` a hair past 1.0 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Rank `catalog` by distance from `origin` and keep the closest `k`.
///
/// The sort is stable, so equidistant points keep their catalog order.
/// An empty catalog yields an empty list; `k` past the catalog size yields
/// the whole catalog ranked.
#[must_use]
pub fn rank_nearest(
    origin: Position,
    catalog: &[AssistancePoint],
    k: usize,
) -> Vec<RankedAssistancePoint> {
    let mut ranked: Vec<RankedAssistancePoint> = catalog
        .iter()
        .map(|point| RankedAssistancePoint {
            distance_km: haversine_km(origin, point.position()),
            point: point.clone(),
        })
        .collect();
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(k);
    ranked
}
