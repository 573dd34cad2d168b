//! End-to-end calendar mutation scenarios: cross-day drags, invariant
//! preservation over call sequences, fixed-activity protection.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use wayfarer_core::calendar::{reschedule_activity, ActivitySelector};
use wayfarer_core::model::{Activity, ActivityCategory, Day, Itinerary, Location};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
}

fn ts(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, d, h, 0, 0).unwrap()
}

fn activity(name: &str, d: u32, start_h: u32, end_h: u32) -> Activity {
    let mut act = Activity::new(
        name,
        ActivityCategory::Event,
        ts(d, start_h),
        ts(d, end_h),
        Location::new(name, "1 Main St"),
    )
    .unwrap();
    act.id = Some(Uuid::new_v4());
    act
}

/// A 3-day itinerary with one activity per day.
fn three_day_itinerary() -> Itinerary {
    let mut it = Itinerary::new("Porto long weekend", "Porto", date(5), date(7), 2).unwrap();
    for d in 5..=7 {
        let mut day = Day::new(date(d));
        day.activities
            .push(activity(&format!("activity-{d}"), d, 10, 12));
        it.days.push(day);
    }
    it
}

fn assert_invariants(it: &Itinerary) {
    // Days sorted by date, no duplicates.
    for pair in it.days.windows(2) {
        assert!(pair[0].date < pair[1].date, "days out of order or duplicated");
    }
    // Activities sorted by start time within each day, on the right date.
    for day in &it.days {
        for pair in day.activities.windows(2) {
            assert!(pair[0].start_time <= pair[1].start_time);
        }
        for act in &day.activities {
            assert_eq!(act.start_time.date_naive(), day.date);
        }
    }
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn drag_day_one_activity_to_day_three() {
    let it = three_day_itinerary();
    let id = it.days[0].activities[0].id.unwrap();

    let next = reschedule_activity(&it, ActivitySelector::Id(id), ts(7, 9), ts(7, 10)).unwrap();

    // Day one is retained, empty; day three holds two activities sorted by
    // start time.
    assert_eq!(next.days.len(), 3);
    assert_eq!(next.days[0].date, date(5));
    assert!(next.days[0].activities.is_empty());

    let day3 = &next.days[2];
    assert_eq!(day3.activities.len(), 2);
    let names: Vec<&str> = day3.activities.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["activity-5", "activity-7"]);

    // The moved activity appears in exactly one day.
    let occurrences: usize = next
        .days
        .iter()
        .map(|d| d.activities.iter().filter(|a| a.id == Some(id)).count())
        .sum();
    assert_eq!(occurrences, 1);

    assert_invariants(&next);
}

#[test]
fn invariants_hold_over_a_sequence_of_reschedules() {
    let mut it = three_day_itinerary();
    let ids: Vec<Uuid> = it
        .days
        .iter()
        .map(|d| d.activities[0].id.unwrap())
        .collect();

    // A scripted gesture sequence: bounce activities between days, create a
    // new trailing day, and pull one back to the first date.
    let moves: &[(Uuid, u32, u32, u32)] = &[
        (ids[0], 6, 8, 9),
        (ids[1], 6, 14, 15),
        (ids[2], 9, 10, 11),
        (ids[0], 5, 18, 20),
        (ids[2], 6, 7, 8),
    ];

    for &(id, d, start_h, end_h) in moves {
        it = reschedule_activity(&it, ActivitySelector::Id(id), ts(d, start_h), ts(d, end_h))
            .unwrap();
        assert_invariants(&it);
    }

    // Final shape: day 5 has ids[0], day 6 has ids[2] then ids[1], day 7
    // empty, day 9 created then vacated again.
    let day6 = it.day_for_date(date(6)).unwrap();
    let names: Vec<&str> = day6.activities.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["activity-7", "activity-6"]);
    assert!(it.day_for_date(date(9)).unwrap().activities.is_empty());
}

#[test]
fn fixed_activity_survives_every_gesture_untouched() {
    let mut it = three_day_itinerary();
    it.days[1].activities[0].is_fixed = true;
    let fixed_id = it.days[1].activities[0].id.unwrap();

    let after_drag =
        reschedule_activity(&it, ActivitySelector::Id(fixed_id), ts(7, 8), ts(7, 9)).unwrap();
    assert_eq!(after_drag, it);

    let after_resize =
        reschedule_activity(&it, ActivitySelector::Id(fixed_id), ts(6, 10), ts(6, 13)).unwrap();
    assert_eq!(after_resize, it);
}

#[test]
fn reschedule_within_day_is_a_pure_reorder() {
    let mut it = three_day_itinerary();
    it.days[0].activities.push(activity("late-show", 5, 21, 23));
    it.days[0].sort_activities();
    let early_id = it.days[0].activities[0].id.unwrap();

    let next =
        reschedule_activity(&it, ActivitySelector::Id(early_id), ts(5, 22), ts(5, 23)).unwrap();

    assert_eq!(next.days[0].activities.len(), 2);
    assert_eq!(next.days[0].activities[0].name, "late-show");
    assert_eq!(next.days[0].activities[1].name, "activity-5");
    assert_invariants(&next);
}

#[test]
fn input_snapshot_is_never_mutated() {
    let it = three_day_itinerary();
    let before = it.clone();
    let id = it.days[0].activities[0].id.unwrap();

    let _ = reschedule_activity(&it, ActivitySelector::Id(id), ts(7, 9), ts(7, 10)).unwrap();
    assert_eq!(it, before);
}
