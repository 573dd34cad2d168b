//! The `wayfarer reschedule` command: apply a calendar drag/resize to a
//! stored itinerary and write the result back.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfarer_core::calendar::{reschedule_activity, ActivitySelector};
use wayfarer_core::reconcile::{load_itinerary, reconcile_itinerary};

pub async fn run_reschedule(
    pool: &PgPool,
    itinerary_id: Uuid,
    activity_id: &str,
    new_start: &str,
    new_end: &str,
) -> Result<()> {
    let activity_id = Uuid::parse_str(activity_id)
        .with_context(|| format!("invalid activity ID: {activity_id}"))?;
    let new_start = parse_timestamp(new_start)?;
    let new_end = parse_timestamp(new_end)?;

    let itinerary = load_itinerary(pool, itinerary_id).await?;
    let edited = reschedule_activity(
        &itinerary,
        ActivitySelector::Id(activity_id),
        new_start,
        new_end,
    )?;

    if edited == itinerary {
        println!("No change (fixed activity or identical times).");
        return Ok(());
    }

    let summary = reconcile_itinerary(pool, itinerary_id, &edited).await?;
    let (day_idx, _, activity) = edited
        .find_activity(activity_id)
        .context("activity missing after reschedule")?;

    println!(
        "Moved {:?} to {} ({} - {}).",
        activity.name,
        edited.days[day_idx].date,
        activity.start_time.format("%H:%M"),
        activity.end_time.format("%H:%M"),
    );
    println!(
        "Saved: {} activities rewritten across {} day(s).",
        summary.activities_written,
        edited.days.len(),
    );
    Ok(())
}

/// Parse an RFC 3339 timestamp (e.g. `2025-06-03T14:00:00Z`).
fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("invalid timestamp {input:?} (expected RFC 3339)"))
}
