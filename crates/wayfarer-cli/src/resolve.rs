//! Itinerary ID resolution.
//!
//! Accepts either a full UUID or a unique hex prefix (like short git
//! hashes) and resolves it against the stored itineraries.

use anyhow::{bail, Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use wayfarer_db::queries::itineraries;

/// Resolve `input` to a stored itinerary id.
///
/// A full UUID is returned as-is (without a database round trip); anything
/// shorter is matched as a prefix of the simple (dashless) id form and
/// must be unambiguous.
pub async fn resolve_itinerary_id(pool: &PgPool, input: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }

    let needle = input.replace('-', "").to_lowercase();
    if needle.is_empty() || !needle.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid itinerary ID: {input:?} (not a UUID or hex prefix)");
    }

    let rows = itineraries::list_itineraries(pool)
        .await
        .context("failed to list itineraries for prefix match")?;

    let matches: Vec<Uuid> = rows
        .iter()
        .map(|r| r.id)
        .filter(|id| id.simple().to_string().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [] => bail!("no itinerary matches {input:?}"),
        [id] => Ok(*id),
        _ => bail!(
            "itinerary ID prefix {input:?} is ambiguous ({} matches)",
            matches.len()
        ),
    }
}
