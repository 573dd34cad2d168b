use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Category of an activity -- drives display color/icon only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Event,
    Restaurant,
    Attraction,
    Transport,
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Event => "event",
            Self::Restaurant => "restaurant",
            Self::Attraction => "attraction",
            Self::Transport => "transport",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityCategory {
    type Err = ActivityCategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(Self::Event),
            "restaurant" => Ok(Self::Restaurant),
            "attraction" => Ok(Self::Attraction),
            "transport" => Ok(Self::Transport),
            other => Err(ActivityCategoryParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ActivityCategory`] string.
#[derive(Debug, Clone)]
pub struct ActivityCategoryParseError(pub String);

impl fmt::Display for ActivityCategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid activity category: {:?}", self.0)
    }
}

impl std::error::Error for ActivityCategoryParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// An itinerary header row -- the top-level unit of a trip.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ItineraryRow {
    pub id: Uuid,
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_guests: i32,
    pub user_id: Option<String>,
    pub total_cost: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A day row -- one calendar date within an itinerary.
///
/// `(itinerary_id, date)` is unique: the date is the natural key the
/// reconciler resolves against.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ItineraryDayRow {
    pub id: Uuid,
    pub itinerary_id: Uuid,
    pub day_number: i32,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

/// An activity row -- a single scheduled item within a day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
