//! Calendar mutation engine: renders the itinerary as calendar events and
//! applies drag/resize reschedules, including moves across day boundaries.
//!
//! Mutations are produce-and-replace: the input snapshot is never touched;
//! a new [`Itinerary`] value comes back, so calendar render, autosave, and
//! the approval view all observe a single atomic change.

pub mod view;

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Activity, Day, Itinerary, ValidationError};

/// Identifies an activity for a calendar gesture: by persisted id, or by
/// position for freshly generated itineraries whose activities have no row
/// ids yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySelector {
    Id(Uuid),
    Position { day: usize, index: usize },
}

impl fmt::Display for ActivitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Position { day, index } => write!(f, "day {day} index {index}"),
        }
    }
}

/// Errors raised by [`reschedule_activity`].
#[derive(Debug, Error)]
pub enum RescheduleError {
    #[error("activity not found: {0}")]
    NotFound(ActivitySelector),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A calendar-displayable event derived from one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub activity_id: Option<Uuid>,
    pub day_index: usize,
    pub activity_index: usize,
}

/// Translate the itinerary into calendar events, one per activity, in the
/// stored (date, start-time) order.
pub fn events(itinerary: &Itinerary) -> Vec<CalendarEvent> {
    let mut out = Vec::with_capacity(itinerary.activity_count());
    for (di, day) in itinerary.days.iter().enumerate() {
        for (ai, act) in day.activities.iter().enumerate() {
            out.push(CalendarEvent {
                title: act.name.clone(),
                start: act.start_time,
                end: act.end_time,
                all_day: false,
                activity_id: act.id,
                day_index: di,
                activity_index: ai,
            });
        }
    }
    out
}

/// Resolve a selector to `(day_index, activity_index)` in the given
/// snapshot.
fn resolve(itinerary: &Itinerary, selector: ActivitySelector) -> Option<(usize, usize)> {
    match selector {
        ActivitySelector::Id(id) => itinerary.find_activity(id).map(|(di, ai, _)| (di, ai)),
        ActivitySelector::Position { day, index } => {
            let d = itinerary.days.get(day)?;
            d.activities.get(index)?;
            Some((day, index))
        }
    }
}

/// Apply a drag or resize gesture: move the selected activity to
/// `[new_start, new_end)`, relocating it to the day matching the new start
/// date (created on demand, date-sorted).
///
/// - A fixed activity is refused independently of the UI: the result is a
///   deep-equal clone of the input.
/// - The vacated day is retained even when left with no activities.
/// - Overlaps within a day are permitted and left to the user.
/// - Rescheduling to the activity's current times is a no-op.
///
/// Drag and resize both funnel through here; a resize simply keeps one of
/// the two endpoints unchanged.
pub fn reschedule_activity(
    itinerary: &Itinerary,
    selector: ActivitySelector,
    new_start: DateTime<Utc>,
    new_end: DateTime<Utc>,
) -> Result<Itinerary, RescheduleError> {
    let (day_idx, act_idx) =
        resolve(itinerary, selector).ok_or(RescheduleError::NotFound(selector))?;

    let current = &itinerary.days[day_idx].activities[act_idx];
    if current.is_fixed {
        // The UI must not have allowed the gesture; refuse it here as well.
        return Ok(itinerary.clone());
    }

    if new_start >= new_end {
        return Err(ValidationError::TimeRange {
            name: current.name.clone(),
            start: new_start,
            end: new_end,
        }
        .into());
    }

    let mut next = itinerary.clone();

    // Remove from the current day; the day itself stays even when emptied.
    let mut activity = next.days[day_idx].activities.remove(act_idx);
    activity.start_time = new_start;
    activity.end_time = new_end;

    let new_date = new_start.date_naive();
    let target_idx = match next.days.iter().position(|d| d.date == new_date) {
        Some(idx) => idx,
        None => {
            let pos = next
                .days
                .iter()
                .position(|d| d.date > new_date)
                .unwrap_or(next.days.len());
            next.days.insert(pos, Day::new(new_date));
            pos
        }
    };
    next.days[target_idx].activities.push(activity);
    next.days[target_idx].sort_activities();

    // Idempotent when the target day was inserted in order above.
    next.sort_days();

    Ok(next)
}

/// Move an activity to an entirely different day while keeping its
/// time-of-day. Convenience wrapper used by day-cell drops (as opposed to
/// time-grid drags).
pub fn move_to_date(
    itinerary: &Itinerary,
    selector: ActivitySelector,
    new_date: chrono::NaiveDate,
) -> Result<Itinerary, RescheduleError> {
    let (day_idx, act_idx) =
        resolve(itinerary, selector).ok_or(RescheduleError::NotFound(selector))?;
    let act = &itinerary.days[day_idx].activities[act_idx];

    let delta = new_date - act.start_time.date_naive();
    let new_start = act.start_time + delta;
    let new_end = act.end_time + delta;
    reschedule_activity(itinerary, selector, new_start, new_end)
}

/// The activity a selector points at, if it resolves in this snapshot.
pub fn selected_activity(
    itinerary: &Itinerary,
    selector: ActivitySelector,
) -> Option<&Activity> {
    let (di, ai) = resolve(itinerary, selector)?;
    Some(&itinerary.days[di].activities[ai])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActivityCategory, Location};
    use chrono::{NaiveDate, TimeZone};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn ts(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, d, h, 0, 0).unwrap()
    }

    fn activity(name: &str, d: u32, start_h: u32, end_h: u32) -> Activity {
        let mut act = Activity::new(
            name,
            ActivityCategory::Attraction,
            ts(d, start_h),
            ts(d, end_h),
            Location::new("spot", "1 Road"),
        )
        .unwrap();
        act.id = Some(Uuid::new_v4());
        act
    }

    fn three_day_trip() -> Itinerary {
        let mut it = Itinerary::new("Trip", "Lisbon", date(1), date(3), 2).unwrap();
        for d in 1..=3 {
            let mut day = Day::new(date(d));
            day.activities.push(activity(&format!("act-{d}"), d, 10, 12));
            it.days.push(day);
        }
        it
    }

    #[test]
    fn events_one_per_activity_in_order() {
        let it = three_day_trip();
        let evs = events(&it);
        assert_eq!(evs.len(), 3);
        assert!(evs.iter().all(|e| !e.all_day));
        assert_eq!(evs[0].title, "act-1");
        assert_eq!(evs[2].day_index, 2);
    }

    #[test]
    fn drag_across_days_retains_empty_source_day() {
        let it = three_day_trip();
        let id = it.days[0].activities[0].id.unwrap();

        let next =
            reschedule_activity(&it, ActivitySelector::Id(id), ts(3, 9), ts(3, 11)).unwrap();

        // Source day retained, empty.
        assert_eq!(next.days.len(), 3);
        assert!(next.days[0].activities.is_empty());
        // Target day has both, sorted by start time.
        let names: Vec<&str> = next.days[2]
            .activities
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, ["act-1", "act-3"]);
        // Input untouched.
        assert_eq!(it.days[0].activities.len(), 1);
    }

    #[test]
    fn drag_to_new_date_creates_day_in_sorted_position() {
        let it = three_day_trip();
        let id = it.days[2].activities[0].id.unwrap();

        let next =
            reschedule_activity(&it, ActivitySelector::Id(id), ts(2, 20), ts(2, 22)).unwrap();
        // No new day needed for an existing date.
        assert_eq!(next.days.len(), 3);

        // Now to a date with no day yet.
        let id2 = next.days[0].activities[0].id.unwrap();
        let next2 =
            reschedule_activity(&next, ActivitySelector::Id(id2), ts(5, 9), ts(5, 10)).unwrap();
        assert_eq!(next2.days.len(), 4);
        let dates: Vec<NaiveDate> = next2.days.iter().map(|d| d.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(next2.days.last().unwrap().date, date(5));
    }

    #[test]
    fn fixed_activity_is_a_deep_equal_no_op() {
        let mut it = three_day_trip();
        it.days[1].activities[0].is_fixed = true;
        let id = it.days[1].activities[0].id.unwrap();

        let next =
            reschedule_activity(&it, ActivitySelector::Id(id), ts(1, 8), ts(1, 9)).unwrap();
        assert_eq!(next, it);
    }

    #[test]
    fn reschedule_to_same_times_is_idempotent() {
        let it = three_day_trip();
        let id = it.days[0].activities[0].id.unwrap();

        let next =
            reschedule_activity(&it, ActivitySelector::Id(id), ts(1, 10), ts(1, 12)).unwrap();
        assert_eq!(next, it);
    }

    #[test]
    fn unknown_activity_is_not_found() {
        let it = three_day_trip();
        let err = reschedule_activity(&it, ActivitySelector::Id(Uuid::new_v4()), ts(1, 8), ts(1, 9))
            .unwrap_err();
        assert!(matches!(err, RescheduleError::NotFound(_)));
    }

    #[test]
    fn inverted_range_is_rejected_without_mutation() {
        let it = three_day_trip();
        let id = it.days[0].activities[0].id.unwrap();
        let err = reschedule_activity(&it, ActivitySelector::Id(id), ts(1, 9), ts(1, 9))
            .unwrap_err();
        assert!(matches!(err, RescheduleError::Validation(_)));
        assert_eq!(it.days[0].activities.len(), 1);
    }

    #[test]
    fn positional_selector_works_for_unpersisted_activities() {
        let mut it = three_day_trip();
        it.days[0].activities[0].id = None;

        let next = reschedule_activity(
            &it,
            ActivitySelector::Position { day: 0, index: 0 },
            ts(2, 8),
            ts(2, 9),
        )
        .unwrap();
        assert!(next.days[0].activities.is_empty());
        assert_eq!(next.days[1].activities[0].name, "act-1");
    }

    #[test]
    fn resize_keeps_day_and_reorders_within_it() {
        let mut it = three_day_trip();
        it.days[0]
            .activities
            .push(activity("late", 1, 14, 16));
        let id = it.days[0].activities[0].id.unwrap();

        // Resize act-1 so it now starts after "late".
        let next =
            reschedule_activity(&it, ActivitySelector::Id(id), ts(1, 17), ts(1, 18)).unwrap();
        let names: Vec<&str> = next.days[0]
            .activities
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, ["late", "act-1"]);
    }

    #[test]
    fn move_to_date_preserves_time_of_day() {
        let it = three_day_trip();
        let id = it.days[0].activities[0].id.unwrap();

        let next = move_to_date(&it, ActivitySelector::Id(id), date(3)).unwrap();
        let moved = next
            .find_activity(id)
            .map(|(_, _, a)| a)
            .expect("still present");
        assert_eq!(moved.start_time, ts(3, 10));
        assert_eq!(moved.end_time, ts(3, 12));
    }
}
