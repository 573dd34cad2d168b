//! The `wayfarer travel` command: annotate a stored itinerary with travel
//! metrics from the routing provider.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use wayfarer_core::model::LatLng;
use wayfarer_core::reconcile::load_itinerary;
use wayfarer_core::travel::{day_legs, trip_summary, HttpRoutingProvider, TravelMode};

pub async fn run_travel(
    pool: &PgPool,
    routing_url: &str,
    id: Uuid,
    modes: &str,
    date: Option<&str>,
) -> Result<()> {
    let modes = parse_modes(modes)?;
    let itinerary = load_itinerary(pool, id).await?;
    let provider = HttpRoutingProvider::new(routing_url);

    if let Some(date) = date {
        let date: NaiveDate = date
            .parse()
            .with_context(|| format!("invalid date {date:?} (expected YYYY-MM-DD)"))?;
        let Some(day) = itinerary.day_for_date(date) else {
            bail!("itinerary has no day on {date}");
        };

        for mode in &modes {
            println!("{date} by {mode}:");
            let legs = day_legs(&provider, day, *mode).await;
            if legs.is_empty() {
                println!("  (fewer than two activities)");
                continue;
            }
            for leg in &legs {
                println!("  {} -> {}: {} ({})", leg.from, leg.to, leg.duration, leg.distance);
            }
        }
        return Ok(());
    }

    // Trip level: consecutive geocoded activities across the whole trip.
    let waypoints: Vec<LatLng> = itinerary
        .flatten()
        .into_iter()
        .filter_map(|(_, a)| a.location.coords)
        .collect();
    if waypoints.len() < 2 {
        bail!("itinerary has fewer than two geocoded activities");
    }

    let summary = trip_summary(&provider, &waypoints, &modes).await;
    if summary.is_empty() {
        bail!("routing provider returned no usable modes");
    }

    for (mode, legs) in &summary {
        println!("By {mode}:");
        for leg in legs {
            println!(
                "  leg {} -> {}: {} ({})",
                leg.from_index, leg.to_index, leg.duration, leg.distance
            );
        }
    }
    for mode in &modes {
        if !summary.contains_key(mode) {
            println!("By {mode}: unavailable");
        }
    }

    Ok(())
}

/// Parse a comma-separated mode list, e.g. `drive,walk`.
fn parse_modes(input: &str) -> Result<Vec<TravelMode>> {
    let modes = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<Vec<TravelMode>, _>>()?;
    if modes.is_empty() {
        bail!("no travel modes given (expected e.g. \"drive,walk\")");
    }
    Ok(modes)
}
