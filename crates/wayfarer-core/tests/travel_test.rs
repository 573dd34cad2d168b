//! Travel-time aggregator tests against a scripted mock routing provider.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use wayfarer_core::model::{Activity, ActivityCategory, Day, LatLng, Location};
use wayfarer_core::travel::{
    day_legs, geocode_places, trip_summary, RouteLeg, RoutingError, RoutingProvider, TravelMode,
};

// ===========================================================================
// Mock routing provider
// ===========================================================================

/// Returns fixed metrics, failing for any mode or place in the deny sets.
struct MockRouting {
    failing_modes: HashSet<TravelMode>,
    failing_places: HashSet<String>,
    route_calls: Mutex<usize>,
}

impl MockRouting {
    fn new() -> Self {
        Self {
            failing_modes: HashSet::new(),
            failing_places: HashSet::new(),
            route_calls: Mutex::new(0),
        }
    }

    fn failing_modes(mut self, modes: &[TravelMode]) -> Self {
        self.failing_modes = modes.iter().copied().collect();
        self
    }

    fn failing_places(mut self, places: &[&str]) -> Self {
        self.failing_places = places.iter().map(|s| s.to_string()).collect();
        self
    }
}

#[async_trait]
impl RoutingProvider for MockRouting {
    async fn route(
        &self,
        _from: LatLng,
        _to: LatLng,
        mode: TravelMode,
    ) -> Result<RouteLeg, RoutingError> {
        *self.route_calls.lock().unwrap() += 1;
        if self.failing_modes.contains(&mode) {
            return Err(RoutingError::Provider("rate limited".to_owned()));
        }
        Ok(RouteLeg {
            distance_meters: 2500.0,
            duration_seconds: 720.0,
        })
    }

    async fn geocode(&self, place: &str) -> Result<LatLng, RoutingError> {
        if self.failing_places.contains(place) {
            return Err(RoutingError::Provider("no match".to_owned()));
        }
        Ok(LatLng { lat: 38.7, lng: -9.1 })
    }
}

// ===========================================================================
// Fixtures
// ===========================================================================

fn waypoints(n: usize) -> Vec<LatLng> {
    (0..n)
        .map(|i| LatLng {
            lat: 38.7 + i as f64 * 0.01,
            lng: -9.1,
        })
        .collect()
}

fn day_with_activities(coords: &[Option<(f64, f64)>]) -> Day {
    let date = NaiveDate::from_ymd_opt(2025, 9, 5).unwrap();
    let mut day = Day::new(date);
    for (i, c) in coords.iter().enumerate() {
        let mut location = Location::new(format!("stop-{i}"), "an address");
        if let Some((lat, lng)) = c {
            location = location.with_coords(*lat, *lng);
        }
        day.activities.push(
            Activity::new(
                format!("stop-{i}"),
                ActivityCategory::Attraction,
                Utc.with_ymd_and_hms(2025, 9, 5, 9 + i as u32, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 9, 5, 10 + i as u32, 0, 0).unwrap(),
                location,
            )
            .unwrap(),
        );
    }
    day
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn failing_modes_are_omitted_not_fatal() {
    let provider =
        MockRouting::new().failing_modes(&[TravelMode::Transit, TravelMode::Bicycle]);
    let modes = [
        TravelMode::Drive,
        TravelMode::Walk,
        TravelMode::Bicycle,
        TravelMode::Transit,
    ];

    let summary = trip_summary(&provider, &waypoints(3), &modes).await;

    assert_eq!(summary.len(), 2);
    assert!(summary.contains_key(&TravelMode::Drive));
    assert!(summary.contains_key(&TravelMode::Walk));
    assert!(!summary.contains_key(&TravelMode::Transit));
    assert!(!summary.contains_key(&TravelMode::Bicycle));
}

#[tokio::test]
async fn trip_summary_has_one_leg_per_consecutive_pair() {
    let provider = MockRouting::new();
    let summary = trip_summary(&provider, &waypoints(4), &[TravelMode::Drive]).await;

    let legs = &summary[&TravelMode::Drive];
    assert_eq!(legs.len(), 3);
    assert_eq!(legs[0].from_index, 0);
    assert_eq!(legs[2].to_index, 3);
    assert_eq!(legs[0].distance, "2.5 km");
    assert_eq!(legs[0].duration, "12 min");
}

#[tokio::test]
async fn single_waypoint_yields_no_legs() {
    let provider = MockRouting::new();
    let summary = trip_summary(&provider, &waypoints(1), &[TravelMode::Walk]).await;
    assert_eq!(summary[&TravelMode::Walk].len(), 0);
}

#[tokio::test]
async fn missing_coordinates_yield_na_legs_that_still_exist() {
    let provider = MockRouting::new();
    let day = day_with_activities(&[
        Some((38.70, -9.10)),
        None,
        Some((38.72, -9.12)),
        Some((38.73, -9.13)),
    ]);

    let legs = day_legs(&provider, &day, TravelMode::Walk).await;

    // Every consecutive pair has an entry, even around the coordinate gap.
    assert_eq!(legs.len(), 3);
    assert_eq!(legs[0].duration, "N/A");
    assert_eq!(legs[0].distance, "N/A");
    assert_eq!(legs[1].duration, "N/A");
    assert_eq!(legs[2].duration, "12 min");
    assert_eq!(legs[2].distance, "2.5 km");
    // Only the fully-geocoded pair reached the provider.
    assert_eq!(*provider.route_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn provider_failure_on_a_day_leg_degrades_to_na() {
    let provider = MockRouting::new().failing_modes(&[TravelMode::Drive]);
    let day = day_with_activities(&[Some((38.70, -9.10)), Some((38.72, -9.12))]);

    let legs = day_legs(&provider, &day, TravelMode::Drive).await;
    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0].from, "stop-0");
    assert_eq!(legs[0].to, "stop-1");
    assert_eq!(legs[0].duration, "N/A");
}

#[tokio::test]
async fn geocoding_tolerates_unresolvable_places() {
    let provider = MockRouting::new().failing_places(&["atlantis"]);
    let places = vec![
        "Praca do Comercio".to_owned(),
        "atlantis".to_owned(),
        "Belem Tower".to_owned(),
    ];

    let resolved = geocode_places(&provider, &places).await;
    assert_eq!(resolved.len(), 3);
    assert!(resolved[0].is_some());
    assert!(resolved[1].is_none());
    assert!(resolved[2].is_some());
}
