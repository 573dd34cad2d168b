//! Integration tests for the persistence reconciler.
//!
//! Each test creates a unique temporary database (shared PostgreSQL
//! container), runs migrations, and drops it on completion.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use wayfarer_core::model::{Activity, ActivityCategory, Day, Itinerary, Location};
use wayfarer_core::reconcile::{
    load_itinerary, reconcile_itinerary, store_new_itinerary, ReconcileError,
};
use wayfarer_db::queries::{activities as activity_db, days as day_db};
use wayfarer_test_utils::{create_test_db, drop_test_db};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
}

fn ts(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, d, h, 0, 0).unwrap()
}

fn activity(name: &str, d: u32, start_h: u32, end_h: u32) -> Activity {
    Activity::new(
        name,
        ActivityCategory::Restaurant,
        ts(d, start_h),
        ts(d, end_h),
        Location::new(name, "12 Rua Nova").with_coords(38.71, -9.14),
    )
    .unwrap()
}

/// Two days, three activities.
fn stored_shape() -> Itinerary {
    let mut it = Itinerary::new("Lisbon weekend", "Lisbon", date(3), date(4), 2).unwrap();
    let mut d1 = Day::new(date(3));
    d1.activities.push(activity("brunch", 3, 10, 11));
    d1.activities.push(activity("castle", 3, 12, 14));
    let mut d2 = Day::new(date(4));
    d2.activities.push(activity("fado night", 4, 20, 22));
    it.days.push(d1);
    it.days.push(d2);
    it
}

#[tokio::test]
async fn edited_itinerary_replaces_stored_activities_exactly() {
    let (pool, db_name) = create_test_db().await;

    let id = store_new_itinerary(&pool, &stored_shape()).await.unwrap();

    // Edit in memory: same two dates, but only two activities in total,
    // one renamed and rescheduled.
    let mut edited = stored_shape();
    edited.days[0].activities.remove(0);
    edited.days[0].activities[0].name = "castle (afternoon)".to_owned();
    edited.days[0].activities[0].start_time = ts(3, 15);
    edited.days[0].activities[0].end_time = ts(3, 17);
    edited.days[0].activities[0].cost = Some(15.0);

    let summary = reconcile_itinerary(&pool, id, &edited).await.unwrap();
    assert_eq!(summary.activities_deleted, 3);
    assert_eq!(summary.activities_written, 2);
    assert_eq!(summary.days_created, 0);

    // Row count matches the in-memory content, field for field.
    let days = day_db::days_for_itinerary(&pool, id).await.unwrap();
    assert_eq!(days.len(), 2);
    let day_ids: Vec<Uuid> = days.iter().map(|d| d.id).collect();
    let count = activity_db::count_activities_for_days(&pool, &day_ids)
        .await
        .unwrap();
    assert_eq!(count, 2);

    let rows = activity_db::activities_for_day(&pool, days[0].id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "castle (afternoon)");
    assert_eq!(rows[0].start_time, ts(3, 15));
    assert_eq!(rows[0].end_time, ts(3, 17));
    assert_eq!(rows[0].cost, Some(15.0));
    assert_eq!(rows[0].category, wayfarer_db::models::ActivityCategory::Restaurant);
    assert_eq!(rows[0].location_name, "castle");
    assert_eq!(rows[0].latitude, Some(38.71));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn a_new_date_gets_a_day_row_with_the_next_number() {
    let (pool, db_name) = create_test_db().await;

    let id = store_new_itinerary(&pool, &stored_shape()).await.unwrap();

    let mut edited = stored_shape();
    let mut d3 = Day::new(date(6));
    d3.activities.push(activity("day trip", 6, 9, 18));
    edited.days.push(d3);

    let summary = reconcile_itinerary(&pool, id, &edited).await.unwrap();
    assert_eq!(summary.days_created, 1);
    assert_eq!(summary.activities_written, 4);

    let days = day_db::days_for_itinerary(&pool, id).await.unwrap();
    assert_eq!(days.len(), 3);
    let new_day = days.iter().find(|d| d.date == date(6)).unwrap();
    assert_eq!(new_day.day_number, 3);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn reconciling_an_unknown_itinerary_is_not_found() {
    let (pool, db_name) = create_test_db().await;

    let err = reconcile_itinerary(&pool, Uuid::new_v4(), &stored_shape())
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::NotFound(_)));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn booking_urls_are_normalized_on_write() {
    let (pool, db_name) = create_test_db().await;

    let mut it = stored_shape();
    it.days[1].activities[0].booking_url =
        Some("  \"https://fado.example/shows?id='42'\"  ".to_owned());

    let id = store_new_itinerary(&pool, &it).await.unwrap();
    let loaded = load_itinerary(&pool, id).await.unwrap();
    assert_eq!(
        loaded.days[1].activities[0].booking_url.as_deref(),
        Some("https://fado.example/shows?id=42")
    );

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn load_round_trips_the_stored_shape() {
    let (pool, db_name) = create_test_db().await;

    let original = stored_shape();
    let id = store_new_itinerary(&pool, &original).await.unwrap();
    let loaded = load_itinerary(&pool, id).await.unwrap();

    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.title, original.title);
    assert_eq!(loaded.days.len(), 2);
    assert_eq!(loaded.days[0].activities.len(), 2);
    // Stored activities come back time-ordered with ids assigned.
    assert_eq!(loaded.days[0].activities[0].name, "brunch");
    assert!(loaded.days[0].activities[0].id.is_some());
    assert_eq!(
        loaded.days[1].activities[0].location.coords.map(|c| c.lat),
        Some(38.71)
    );

    // Reconciling the loaded value back is a clean no-op shape-wise.
    let summary = reconcile_itinerary(&pool, id, &loaded).await.unwrap();
    assert_eq!(summary.activities_deleted, 3);
    assert_eq!(summary.activities_written, 3);
    assert_eq!(summary.days_created, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn failed_reconciliation_rolls_back_cleanly() {
    let (pool, db_name) = create_test_db().await;

    let id = store_new_itinerary(&pool, &stored_shape()).await.unwrap();

    // An edited itinerary whose activity violates a storage constraint
    // (negative cost bypassing the model constructor).
    let mut edited = stored_shape();
    edited.days[0].activities[0].cost = Some(-10.0);

    let err = reconcile_itinerary(&pool, id, &edited).await.unwrap_err();
    assert!(matches!(err, ReconcileError::Backend(_)));

    // The stored rows are untouched: still three activities.
    let days = day_db::days_for_itinerary(&pool, id).await.unwrap();
    let day_ids: Vec<Uuid> = days.iter().map(|d| d.id).collect();
    let count = activity_db::count_activities_for_days(&pool, &day_ids)
        .await
        .unwrap();
    assert_eq!(count, 3);

    pool.close().await;
    drop_test_db(&db_name).await;
}
