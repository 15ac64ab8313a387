use shecurity_core::{directions_url, location_link, AppConfig, Position, RankedAssistancePoint};
use shecurity_location::{LocationOptions, LocationProvider};
use shecurity_session::location_notice;

use crate::context;

/// Print ranked stations as a table with a directions link per row.
pub(crate) fn print_ranked(origin: Position, ranked: &[RankedAssistancePoint]) {
    if ranked.is_empty() {
        println!("no police stations in the catalog");
        return;
    }
    println!("{:<36}{:>10}  DIRECTIONS", "STATION", "DISTANCE");
    for entry in ranked {
        println!(
            "{:<36}{:>7.2} km  {}",
            entry.point.name,
            entry.distance_km,
            directions_url(origin, entry.point.position())
        );
    }
}

async fn resolve(config: &AppConfig) -> anyhow::Result<Position> {
    let geolocator = context::geolocator(config, None)?;
    let fix = geolocator
        .current_position(LocationOptions::from(&config.location))
        .await
        .map_err(|e| anyhow::anyhow!(location_notice(&e)))?;
    tracing::debug!(source = %fix.source, "position resolved");
    Ok(fix.position)
}

/// Resolve the current position once and print it with a map link.
///
/// # Errors
///
/// Returns an error if no location source is configured or the query fails.
pub(crate) async fn run_locate(config: &AppConfig) -> anyhow::Result<()> {
    let position = resolve(config).await?;
    println!("{position}");
    println!("{}", location_link(position));
    Ok(())
}

/// Print the closest stations to `origin`, or to the resolved position.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or no position is available.
pub(crate) async fn run_nearest(
    config: &AppConfig,
    limit: Option<usize>,
    origin: Option<Position>,
) -> anyhow::Result<()> {
    let origin = match origin {
        Some(position) => position,
        None => resolve(config).await?,
    };
    let catalog = context::catalog(config)?;
    let ranked =
        shecurity_core::rank_nearest(origin, &catalog, limit.unwrap_or(config.nearest_limit));
    print_ranked(origin, &ranked);
    Ok(())
}
