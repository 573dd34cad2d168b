//! The `Planner` trait -- the seam to the itinerary planning backend.
//!
//! The backend turns a natural-language conversation (plus any approval
//! decisions from a previous round) into a structured [`Itinerary`]. Its
//! internal reasoning is opaque; this module only defines the wire contract
//! and an HTTP implementation.
//!
//! # Object Safety
//!
//! The trait is object-safe so sessions can hold `Box<dyn Planner>` and
//! tests can inject mocks.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Itinerary;

pub use http::HttpPlanner;

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One line of the running chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One activity's approval decision, flattened for the wire.
///
/// `day` and `index` are positions within the itinerary snapshot the
/// decision was made against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalEntry {
    pub day: usize,
    pub index: usize,
    pub title: String,
    /// `Some(true)` approved, `Some(false)` rejected, `None` undecided.
    pub decision: Option<bool>,
}

/// Request payload for generation and regeneration.
#[derive(Debug, Clone, Serialize)]
pub struct PlanRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approvals: Option<Vec<ApprovalEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_itinerary: Option<Itinerary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// What the backend produced: a structured itinerary, or a plain chat
/// message when no itinerary could be assembled from the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanResponse {
    Itinerary(Itinerary),
    Message(ChatMessage),
}

/// Errors from the planning backend call.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("planning backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("planning backend returned status {0}")]
    Status(u16),

    #[error("planning backend returned a malformed payload: {0}")]
    Malformed(String),
}

/// Adapter interface for the planning backend.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Send one generation round and return the backend's proposal.
    async fn plan(&self, request: &PlanRequest) -> Result<PlanResponse, PlannerError>;
}

// Compile-time assertion: Planner must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Planner) {}
};
