//! The `wayfarer plan` command: send a natural-language request to the
//! planning backend and store the returned itinerary.

use anyhow::{Context, Result};
use sqlx::PgPool;

use wayfarer_core::planner::HttpPlanner;
use wayfarer_core::reconcile::store_new_itinerary;
use wayfarer_core::session::{PlanOutcome, PlanningSession};

pub async fn run_plan(
    pool: &PgPool,
    planner_url: &str,
    prompt: &str,
    user_id: Option<&str>,
) -> Result<()> {
    let planner = HttpPlanner::new(planner_url);
    let mut session = PlanningSession::new(Box::new(planner));
    if let Some(user) = user_id {
        session = session.with_user(user);
    }

    println!("Requesting itinerary from planning backend...");
    let outcome = session
        .propose(prompt)
        .await
        .context("planning request failed")?;

    match outcome {
        PlanOutcome::ItineraryReplaced => {
            let itinerary = session
                .current()
                .context("planner reported success without an itinerary")?;
            let id = store_new_itinerary(pool, itinerary).await?;

            println!(
                "Stored itinerary {id}: {} ({} to {}, {} days, {} activities)",
                itinerary.title,
                itinerary.start_date,
                itinerary.end_date,
                itinerary.days.len(),
                itinerary.activity_count(),
            );
            println!("Next: `wayfarer show {id}` or `wayfarer export {id}`.");
        }
        PlanOutcome::MessageAppended => {
            // The backend needs more information before it can produce a
            // structured itinerary.
            if let Some(message) = session.transcript().last() {
                println!("Planner: {}", message.content);
            }
        }
        PlanOutcome::StaleDiscarded => {
            // Cannot happen for a single synchronous round; keep the match
            // exhaustive rather than panicking.
            println!("Planner response discarded.");
        }
    }

    Ok(())
}
