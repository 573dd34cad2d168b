//! Database query functions for the `itineraries` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ItineraryRow;

/// Parameters for inserting a new itinerary header row.
#[derive(Debug, Clone)]
pub struct NewItinerary {
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_guests: i32,
    pub user_id: Option<String>,
    pub total_cost: Option<f64>,
}

/// Insert a new itinerary header row. Returns the inserted row with
/// server-generated defaults (id, created_at).
pub async fn insert_itinerary(pool: &PgPool, new: &NewItinerary) -> Result<ItineraryRow> {
    let row = sqlx::query_as::<_, ItineraryRow>(
        "INSERT INTO itineraries (title, destination, start_date, end_date, num_guests, user_id, total_cost) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING *",
    )
    .bind(&new.title)
    .bind(&new.destination)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.num_guests)
    .bind(&new.user_id)
    .bind(new.total_cost)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert itinerary {:?}", new.title))?;

    Ok(row)
}

/// Fetch a single itinerary by ID.
pub async fn get_itinerary(pool: &PgPool, id: Uuid) -> Result<Option<ItineraryRow>> {
    let row = sqlx::query_as::<_, ItineraryRow>("SELECT * FROM itineraries WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch itinerary")?;

    Ok(row)
}

/// List all itineraries, most recently created first.
pub async fn list_itineraries(pool: &PgPool) -> Result<Vec<ItineraryRow>> {
    let rows =
        sqlx::query_as::<_, ItineraryRow>("SELECT * FROM itineraries ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
            .context("failed to list itineraries")?;

    Ok(rows)
}

/// List all itineraries belonging to a user, most recently created first.
pub async fn list_itineraries_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<ItineraryRow>> {
    let rows = sqlx::query_as::<_, ItineraryRow>(
        "SELECT * FROM itineraries WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list itineraries for user")?;

    Ok(rows)
}

/// Delete an itinerary. Day and activity rows go with it via ON DELETE
/// CASCADE.
pub async fn delete_itinerary(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM itineraries WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete itinerary")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("itinerary {id} not found");
    }

    Ok(())
}
