//! PostgreSQL persistence layer for wayfarer.
//!
//! Row models, connection pool management, embedded migrations, and query
//! functions for the `itineraries`, `itinerary_days`, and `activities`
//! tables.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
