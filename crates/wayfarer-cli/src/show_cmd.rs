//! The `wayfarer list` and `wayfarer show` commands.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use wayfarer_core::model::activity_label;
use wayfarer_core::reconcile::load_itinerary;
use wayfarer_db::queries::itineraries;

/// Print a one-line summary per stored itinerary.
pub async fn run_list(pool: &PgPool) -> Result<()> {
    let rows = itineraries::list_itineraries(pool).await?;

    if rows.is_empty() {
        println!("No itineraries stored. Create one with `wayfarer plan \"...\"`.");
        return Ok(());
    }

    println!(
        "{:<10} {:<28} {:<16} {:<12} {:<12} {:>6}",
        "ID", "TITLE", "DESTINATION", "START", "END", "GUESTS"
    );
    for row in &rows {
        println!(
            "{:<10} {:<28} {:<16} {:<12} {:<12} {:>6}",
            short_id(row.id),
            truncate(&row.title, 27),
            truncate(&row.destination, 15),
            row.start_date,
            row.end_date,
            row.num_guests,
        );
    }
    Ok(())
}

/// Print the full day-by-day contents of one itinerary.
pub async fn run_show(pool: &PgPool, id: Uuid) -> Result<()> {
    let itinerary = load_itinerary(pool, id).await?;

    println!("{} -- {}", itinerary.title, itinerary.destination);
    println!(
        "{} to {}, {} guest(s)",
        itinerary.start_date, itinerary.end_date, itinerary.guests
    );
    if let Some(cost) = itinerary.total_cost {
        println!("Estimated total: {cost:.2}");
    }

    for day in &itinerary.days {
        println!();
        println!("{}", day.date.format("%A, %B %-d"));
        if day.activities.is_empty() {
            println!("  (no activities)");
            continue;
        }
        for (i, act) in day.activities.iter().enumerate() {
            let fixed = if act.is_fixed { " [fixed]" } else { "" };
            println!(
                "  {}. {} - {}  {}{}",
                activity_label(i),
                act.start_time.format("%H:%M"),
                act.end_time.format("%H:%M"),
                act.name,
                fixed,
            );
            println!("     {} ({})", act.location.name, act.category);
            if let Some(desc) = &act.description {
                println!("     {desc}");
            }
        }
    }
    Ok(())
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_owned()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_owned()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
