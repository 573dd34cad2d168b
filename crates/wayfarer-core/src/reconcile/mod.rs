//! Persistence reconciliation: make the stored day/activity rows match an
//! edited in-memory itinerary.
//!
//! Strategy is replace-by-date: activities carry no identity the client
//! can reliably diff against after free-form edits, so each day's stored
//! activities are fully replaced rather than field-diffed. Day rows are
//! resolved by their `(itinerary_id, date)` natural key and created for
//! dates not yet stored.
//!
//! The whole read/delete/insert sequence runs inside a single database
//! transaction: a mid-sequence failure rolls back and surfaces as a save
//! failure, leaving the stored itinerary as it was.

use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use wayfarer_db::models::{ActivityRow, ItineraryDayRow, ItineraryRow};

use crate::model::{Activity, Day, Itinerary, LatLng, Location};

/// Errors raised by reconciliation and itinerary load/store.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("itinerary {0} not found")]
    NotFound(Uuid),

    #[error("save failed: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Counts reported back for the caller's "saved" confirmation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub days_created: usize,
    pub activities_deleted: usize,
    pub activities_written: usize,
}

/// Normalize a booking URL for storage: trim surrounding whitespace and
/// strip embedded quote characters. Returns `None` when nothing is left.
pub fn normalize_booking_url(url: &str) -> Option<String> {
    let cleaned: String = url.trim().chars().filter(|c| *c != '"' && *c != '\'').collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Replace the stored day/activity rows of `itinerary_id` with the content
/// of the in-memory `itinerary`.
///
/// Steps, all inside one transaction:
/// 1. Read the stored day rows into a `date -> day_id` map.
/// 2. Collect the stored activity ids belonging to those days.
/// 3. Delete the collected activity rows.
/// 4. For each in-memory day in order, resolve its stored day row via the
///    date map (creating one for a new date), then insert one activity row
///    per in-memory activity.
pub async fn reconcile_itinerary(
    pool: &PgPool,
    itinerary_id: Uuid,
    itinerary: &Itinerary,
) -> Result<ReconcileSummary, ReconcileError> {
    let mut tx = pool.begin().await?;

    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM itineraries WHERE id = $1")
        .bind(itinerary_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(ReconcileError::NotFound(itinerary_id));
    }

    // 1. Stored days, keyed by date.
    let stored_days: Vec<ItineraryDayRow> = sqlx::query_as(
        "SELECT * FROM itinerary_days WHERE itinerary_id = $1 ORDER BY date ASC",
    )
    .bind(itinerary_id)
    .fetch_all(&mut *tx)
    .await?;

    let mut next_day_number = stored_days.iter().map(|d| d.day_number).max().unwrap_or(0) + 1;
    let day_ids: Vec<Uuid> = stored_days.iter().map(|d| d.id).collect();

    // 2. Stored activity ids for those days.
    let activity_ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT id FROM activities WHERE day_id = ANY($1)")
            .bind(&day_ids)
            .fetch_all(&mut *tx)
            .await?;

    // 3. Delete them all.
    let deleted = sqlx::query("DELETE FROM activities WHERE id = ANY($1)")
        .bind(&activity_ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    // 4. Re-insert from the in-memory state.
    let mut days_created = 0;
    let mut activities_written = 0;

    for day in &itinerary.days {
        let day_id = match stored_days.iter().find(|d| d.date == day.date) {
            Some(stored) => stored.id,
            None => {
                let row: ItineraryDayRow = sqlx::query_as(
                    "INSERT INTO itinerary_days (itinerary_id, day_number, date) \
                     VALUES ($1, $2, $3) \
                     RETURNING *",
                )
                .bind(itinerary_id)
                .bind(next_day_number)
                .bind(day.date)
                .fetch_one(&mut *tx)
                .await?;
                next_day_number += 1;
                days_created += 1;
                row.id
            }
        };

        for activity in &day.activities {
            insert_activity_row(&mut tx, day_id, activity).await?;
            activities_written += 1;
        }
    }

    tx.commit().await?;

    let summary = ReconcileSummary {
        days_created,
        activities_deleted: deleted as usize,
        activities_written,
    };
    info!(
        itinerary_id = %itinerary_id,
        days_created = summary.days_created,
        activities_deleted = summary.activities_deleted,
        activities_written = summary.activities_written,
        "itinerary reconciled"
    );
    Ok(summary)
}

async fn insert_activity_row(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    day_id: Uuid,
    activity: &Activity,
) -> Result<(), sqlx::Error> {
    let (latitude, longitude) = match activity.location.coords {
        Some(LatLng { lat, lng }) => (Some(lat), Some(lng)),
        None => (None, None),
    };
    let booking_url = activity
        .booking_url
        .as_deref()
        .and_then(normalize_booking_url);

    sqlx::query(
        "INSERT INTO activities (day_id, name, category, description, start_time, end_time, \
                                 cost, is_fixed, location_name, location_address, latitude, \
                                 longitude, notes, booking_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
    )
    .bind(day_id)
    .bind(&activity.name)
    .bind(activity.category)
    .bind(&activity.description)
    .bind(activity.start_time)
    .bind(activity.end_time)
    .bind(activity.cost)
    .bind(activity.is_fixed)
    .bind(&activity.location.name)
    .bind(&activity.location.address)
    .bind(latitude)
    .bind(longitude)
    .bind(&activity.notes)
    .bind(booking_url)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Insert a brand-new itinerary (header, days, activities) in one
/// transaction. Returns the new itinerary id.
pub async fn store_new_itinerary(
    pool: &PgPool,
    itinerary: &Itinerary,
) -> Result<Uuid, ReconcileError> {
    let mut tx = pool.begin().await?;

    let header: ItineraryRow = sqlx::query_as(
        "INSERT INTO itineraries (title, destination, start_date, end_date, num_guests, user_id, total_cost) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING *",
    )
    .bind(&itinerary.title)
    .bind(&itinerary.destination)
    .bind(itinerary.start_date)
    .bind(itinerary.end_date)
    .bind(itinerary.guests as i32)
    .bind(&itinerary.user_id)
    .bind(itinerary.total_cost)
    .fetch_one(&mut *tx)
    .await?;

    for (number, day) in itinerary.days.iter().enumerate() {
        let day_row: ItineraryDayRow = sqlx::query_as(
            "INSERT INTO itinerary_days (itinerary_id, day_number, date) \
             VALUES ($1, $2, $3) \
             RETURNING *",
        )
        .bind(header.id)
        .bind(number as i32 + 1)
        .bind(day.date)
        .fetch_one(&mut *tx)
        .await?;

        for activity in &day.activities {
            insert_activity_row(&mut tx, day_row.id, activity).await?;
        }
    }

    tx.commit().await?;

    info!(itinerary_id = %header.id, title = %itinerary.title, "itinerary stored");
    Ok(header.id)
}

/// Reconstruct an in-memory [`Itinerary`] from storage: days date-ordered,
/// activities time-ordered.
pub async fn load_itinerary(pool: &PgPool, id: Uuid) -> Result<Itinerary, ReconcileError> {
    let header: Option<ItineraryRow> = sqlx::query_as("SELECT * FROM itineraries WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let header = header.ok_or(ReconcileError::NotFound(id))?;

    let day_rows: Vec<ItineraryDayRow> = sqlx::query_as(
        "SELECT * FROM itinerary_days WHERE itinerary_id = $1 ORDER BY date ASC",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let mut days = Vec::with_capacity(day_rows.len());
    for day_row in &day_rows {
        let activity_rows: Vec<ActivityRow> = sqlx::query_as(
            "SELECT * FROM activities WHERE day_id = $1 ORDER BY start_time ASC",
        )
        .bind(day_row.id)
        .fetch_all(pool)
        .await?;

        let mut day = Day::new(day_row.date);
        day.activities = activity_rows.iter().map(activity_from_row).collect();
        days.push(day);
    }

    Ok(Itinerary {
        id: Some(header.id),
        user_id: header.user_id,
        title: header.title,
        destination: header.destination,
        start_date: header.start_date,
        end_date: header.end_date,
        guests: header.num_guests as u32,
        days,
        total_cost: header.total_cost,
    })
}

fn activity_from_row(row: &ActivityRow) -> Activity {
    let coords = match (row.latitude, row.longitude) {
        (Some(lat), Some(lng)) => Some(LatLng { lat, lng }),
        _ => None,
    };
    Activity {
        id: Some(row.id),
        name: row.name.clone(),
        category: row.category,
        description: row.description.clone(),
        notes: row.notes.clone(),
        booking_url: row.booking_url.clone(),
        start_time: row.start_time,
        end_time: row.end_time,
        location: Location {
            name: row.location_name.clone(),
            address: row.location_address.clone(),
            coords,
        },
        is_fixed: row.is_fixed,
        cost: row.cost,
    }
}
