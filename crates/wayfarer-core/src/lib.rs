//! Core engine for wayfarer: the in-memory itinerary model, the calendar
//! mutation engine, the approval/regeneration session, the persistence
//! reconciler, and the travel-time aggregator.
//!
//! Everything in-memory is pure produce-and-replace: mutations take a
//! snapshot by reference and return a new value, so every observer of the
//! current itinerary sees a single atomic change. I/O lives behind the
//! [`planner::Planner`] and [`travel::RoutingProvider`] seams and in the
//! [`reconcile`] module's database transaction.

pub mod calendar;
pub mod export;
pub mod model;
pub mod planner;
pub mod reconcile;
pub mod session;
pub mod travel;
