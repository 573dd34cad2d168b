//! The `wayfarer export` command: write an itinerary summary as CSV.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use wayfarer_core::export::write_csv;
use wayfarer_core::reconcile::load_itinerary;

pub async fn run_export(pool: &PgPool, id: Uuid, output: Option<&str>) -> Result<()> {
    use std::io::Write;

    let itinerary = load_itinerary(pool, id).await?;
    let rows = itinerary.activity_count();

    let mut writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("cannot create output file: {path}"))?,
        )
    } else {
        Box::new(std::io::stdout().lock())
    };

    write_csv(&itinerary, &mut writer).context("failed to write CSV")?;

    if let Some(path) = output {
        println!("Exported {rows} rows to {path}");
    }

    Ok(())
}
