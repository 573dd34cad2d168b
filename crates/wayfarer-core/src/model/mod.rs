//! The in-memory itinerary model: passive value types plus
//! invariant-checking constructors and pure query helpers.
//!
//! Invariants held by every value that leaves this module:
//! - an activity's `start_time` is strictly before its `end_time`
//! - a day's activities are sorted ascending by `start_time`
//! - an itinerary's days are sorted ascending by `date` with no duplicates
//! - `guests >= 1` and `start_date <= end_date`

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use wayfarer_db::models::ActivityCategory;

/// Errors raised when constructing model values from invalid input. Each
/// variant names the offending field.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("guests: must be at least 1")]
    GuestCount,

    #[error("end_date: {end} is before start_date {start}")]
    DateRange { start: NaiveDate, end: NaiveDate },

    #[error("end_time: {end} is not after start_time {start} on activity {name:?}")]
    TimeRange {
        name: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("cost: must be non-negative, got {cost} on activity {name:?}")]
    NegativeCost { name: String, cost: f64 },
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Where an activity takes place. Coordinates are optional: free-text
/// places from the planning backend may not have been geocoded yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub address: String,
    pub coords: Option<LatLng>,
}

impl Location {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            coords: None,
        }
    }

    pub fn with_coords(mut self, lat: f64, lng: f64) -> Self {
        self.coords = Some(LatLng { lat, lng });
        self
    }
}

/// A single scheduled item within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Absent until the activity has been persisted.
    pub id: Option<Uuid>,
    pub name: String,
    pub category: ActivityCategory,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub booking_url: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Location,
    /// A fixed activity's times and containing day are protected from
    /// calendar mutation. Direct field edits may still change them.
    pub is_fixed: bool,
    pub cost: Option<f64>,
}

impl Activity {
    /// Construct an activity, rejecting an inverted time range.
    pub fn new(
        name: impl Into<String>,
        category: ActivityCategory,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        location: Location,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if start_time >= end_time {
            return Err(ValidationError::TimeRange {
                name,
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            id: None,
            name,
            category,
            description: None,
            notes: None,
            booking_url: None,
            start_time,
            end_time,
            location,
            is_fixed: false,
            cost: None,
        })
    }

    /// Set the cost, rejecting negative values.
    pub fn with_cost(mut self, cost: f64) -> Result<Self, ValidationError> {
        if cost < 0.0 {
            return Err(ValidationError::NegativeCost {
                name: self.name,
                cost,
            });
        }
        self.cost = Some(cost);
        Ok(self)
    }

    /// Re-check the time and cost invariants (after direct field edits).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start_time >= self.end_time {
            return Err(ValidationError::TimeRange {
                name: self.name.clone(),
                start: self.start_time,
                end: self.end_time,
            });
        }
        if let Some(cost) = self.cost {
            if cost < 0.0 {
                return Err(ValidationError::NegativeCost {
                    name: self.name.clone(),
                    cost,
                });
            }
        }
        Ok(())
    }
}

/// A date-keyed ordered collection of activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub date: NaiveDate,
    pub activities: Vec<Activity>,
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            activities: Vec::new(),
        }
    }

    /// Re-establish the start-time ordering after a mutation. The sort is
    /// stable: activities with equal start times keep their relative order.
    pub fn sort_activities(&mut self) {
        self.activities.sort_by_key(|a| a.start_time);
    }

    /// Ordinal position of an activity within this day, by persisted id.
    pub fn ordinal_of(&self, id: Uuid) -> Option<usize> {
        self.activities.iter().position(|a| a.id == Some(id))
    }
}

/// Sequence label for an activity ordinal: `A`, `B`, .. `Z`, `AA`, `AB`, ..
///
/// Derived from the day's current activity order; recomputed whenever the
/// order changes, never stored.
pub fn activity_label(ordinal: usize) -> String {
    let mut n = ordinal;
    let mut label = String::new();
    loop {
        label.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label
}

/// A multi-day trip: header fields plus a date-sorted sequence of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    /// Absent until the itinerary has been persisted.
    pub id: Option<Uuid>,
    pub user_id: Option<String>,
    pub title: String,
    pub destination: String,
    /// Inclusive range. Days need not cover it contiguously.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: u32,
    pub days: Vec<Day>,
    /// Informational only; never recomputed by the core.
    pub total_cost: Option<f64>,
}

impl Itinerary {
    /// Construct an itinerary header, rejecting an inverted date range and
    /// a zero guest count.
    pub fn new(
        title: impl Into<String>,
        destination: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        guests: u32,
    ) -> Result<Self, ValidationError> {
        if guests == 0 {
            return Err(ValidationError::GuestCount);
        }
        if end_date < start_date {
            return Err(ValidationError::DateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            id: None,
            user_id: None,
            title: title.into(),
            destination: destination.into(),
            start_date,
            end_date,
            guests,
            days: Vec::new(),
            total_cost: None,
        })
    }

    /// Re-establish the date ordering of `days`.
    pub fn sort_days(&mut self) {
        self.days.sort_by_key(|d| d.date);
    }

    /// The day holding a given date, if any.
    pub fn day_for_date(&self, date: NaiveDate) -> Option<&Day> {
        self.days.iter().find(|d| d.date == date)
    }

    /// All activities across all days, in date order then start-time order.
    pub fn flatten(&self) -> Vec<(&Day, &Activity)> {
        self.days
            .iter()
            .flat_map(|d| d.activities.iter().map(move |a| (d, a)))
            .collect()
    }

    /// Locate an activity by persisted id across all days. Returns
    /// `(day_index, activity_index, &activity)`.
    pub fn find_activity(&self, id: Uuid) -> Option<(usize, usize, &Activity)> {
        for (di, day) in self.days.iter().enumerate() {
            for (ai, act) in day.activities.iter().enumerate() {
                if act.id == Some(id) {
                    return Some((di, ai, act));
                }
            }
        }
        None
    }

    /// Total number of activities across all days.
    pub fn activity_count(&self) -> usize {
        self.days.iter().map(|d| d.activities.len()).sum()
    }
}
