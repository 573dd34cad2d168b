//! Database query functions for the `activities` table.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ActivityCategory, ActivityRow};

/// Parameters for inserting a new activity row.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub day_id: Uuid,
    pub name: String,
    pub category: ActivityCategory,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub cost: Option<f64>,
    pub is_fixed: bool,
    pub location_name: String,
    pub location_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    pub booking_url: Option<String>,
}

/// Insert a new activity row. Returns the inserted row with its
/// server-generated id.
pub async fn insert_activity(pool: &PgPool, new: &NewActivity) -> Result<ActivityRow> {
    let row = sqlx::query_as::<_, ActivityRow>(
        "INSERT INTO activities (day_id, name, category, description, start_time, end_time, \
                                 cost, is_fixed, location_name, location_address, latitude, \
                                 longitude, notes, booking_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         RETURNING *",
    )
    .bind(new.day_id)
    .bind(&new.name)
    .bind(new.category)
    .bind(&new.description)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(new.cost)
    .bind(new.is_fixed)
    .bind(&new.location_name)
    .bind(&new.location_address)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(&new.notes)
    .bind(&new.booking_url)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert activity {:?} for day {}", new.name, new.day_id))?;

    Ok(row)
}

/// Fetch a single activity by ID.
pub async fn get_activity(pool: &PgPool, id: Uuid) -> Result<Option<ActivityRow>> {
    let row = sqlx::query_as::<_, ActivityRow>("SELECT * FROM activities WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch activity")?;

    Ok(row)
}

/// List all activities for a day, ordered by start time.
pub async fn activities_for_day(pool: &PgPool, day_id: Uuid) -> Result<Vec<ActivityRow>> {
    let rows = sqlx::query_as::<_, ActivityRow>(
        "SELECT * FROM activities WHERE day_id = $1 ORDER BY start_time ASC",
    )
    .bind(day_id)
    .fetch_all(pool)
    .await
    .context("failed to list activities for day")?;

    Ok(rows)
}

/// List all activities belonging to any of the given days, ordered by
/// start time.
pub async fn activities_for_days(pool: &PgPool, day_ids: &[Uuid]) -> Result<Vec<ActivityRow>> {
    let rows = sqlx::query_as::<_, ActivityRow>(
        "SELECT * FROM activities WHERE day_id = ANY($1) ORDER BY start_time ASC",
    )
    .bind(day_ids)
    .fetch_all(pool)
    .await
    .context("failed to list activities for days")?;

    Ok(rows)
}

/// Delete every activity belonging to any of the given days. Returns the
/// number of rows deleted.
pub async fn delete_activities_for_days(pool: &PgPool, day_ids: &[Uuid]) -> Result<u64> {
    let result = sqlx::query("DELETE FROM activities WHERE day_id = ANY($1)")
        .bind(day_ids)
        .execute(pool)
        .await
        .context("failed to delete activities for days")?;

    Ok(result.rows_affected())
}

/// Count activities belonging to any of the given days.
pub async fn count_activities_for_days(pool: &PgPool, day_ids: &[Uuid]) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activities WHERE day_id = ANY($1)")
        .bind(day_ids)
        .fetch_one(pool)
        .await
        .context("failed to count activities for days")?;

    Ok(row.0)
}
