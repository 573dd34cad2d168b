//! Database query functions for the `itinerary_days` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ItineraryDayRow;

/// Insert a new day row. Returns the inserted row with its
/// server-generated id.
pub async fn insert_day(
    pool: &PgPool,
    itinerary_id: Uuid,
    day_number: i32,
    date: NaiveDate,
    notes: Option<&str>,
) -> Result<ItineraryDayRow> {
    let row = sqlx::query_as::<_, ItineraryDayRow>(
        "INSERT INTO itinerary_days (itinerary_id, day_number, date, notes) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(itinerary_id)
    .bind(day_number)
    .bind(date)
    .bind(notes)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert day {date} for itinerary {itinerary_id}"))?;

    Ok(row)
}

/// Fetch a single day by ID.
pub async fn get_day(pool: &PgPool, id: Uuid) -> Result<Option<ItineraryDayRow>> {
    let row = sqlx::query_as::<_, ItineraryDayRow>("SELECT * FROM itinerary_days WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch day")?;

    Ok(row)
}

/// List all days for an itinerary, ordered by date.
pub async fn days_for_itinerary(pool: &PgPool, itinerary_id: Uuid) -> Result<Vec<ItineraryDayRow>> {
    let rows = sqlx::query_as::<_, ItineraryDayRow>(
        "SELECT * FROM itinerary_days WHERE itinerary_id = $1 ORDER BY date ASC",
    )
    .bind(itinerary_id)
    .fetch_all(pool)
    .await
    .context("failed to list days for itinerary")?;

    Ok(rows)
}
