//! The editing session: owns the single current itinerary, the chat
//! transcript, the per-activity approval map, and the calendar view state,
//! and drives the approve/reject + regenerate loop against the planning
//! backend.
//!
//! Every mutation is produce-and-replace on the owned snapshot. Responses
//! from the backend are applied through a monotonically increasing
//! generation token: a response that started against an older snapshot is
//! discarded instead of clobbering the current one.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calendar::view::ViewState;
use crate::calendar::{self, ActivitySelector, RescheduleError};
use crate::model::Itinerary;
use crate::planner::{
    ApprovalEntry, ChatMessage, PlanRequest, PlanResponse, Planner, PlannerError,
};

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no itinerary in the session")]
    NoItinerary,

    #[error(transparent)]
    Backend(#[from] PlannerError),

    #[error(transparent)]
    Reschedule(#[from] RescheduleError),
}

/// What a generation round produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOutcome {
    /// The backend returned a structured itinerary and it replaced the
    /// current one.
    ItineraryReplaced,
    /// The backend answered with a plain chat message; the itinerary and
    /// approvals are unchanged.
    MessageAppended,
    /// The response arrived for an older generation and was discarded.
    StaleDiscarded,
}

/// Per-activity approve/reject/undecided tri-state, keyed by position
/// within the current itinerary snapshot.
///
/// The key is `(day_index, activity_index)`, not a persistent activity id:
/// if regeneration reorders, adds, or removes activities within a day,
/// prior decisions stay attached to the position, not the conceptual
/// activity. Callers that need identity-stable correlation must re-key
/// themselves; the map is cleared on every successful regeneration anyway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApprovalMap {
    decisions: HashMap<(usize, usize), bool>,
}

impl ApprovalMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The decision for an activity: `Some(true)` approved, `Some(false)`
    /// rejected, `None` undecided.
    pub fn get(&self, day: usize, index: usize) -> Option<bool> {
        self.decisions.get(&(day, index)).copied()
    }

    /// Set or toggle a decision. Setting the already-selected value resets
    /// it to undecided; the opposite value overwrites unconditionally.
    pub fn set(&mut self, day: usize, index: usize, value: bool) {
        let key = (day, index);
        if self.decisions.get(&key) == Some(&value) {
            self.decisions.remove(&key);
        } else {
            self.decisions.insert(key, value);
        }
    }

    /// Drop every decision.
    pub fn clear(&mut self) {
        self.decisions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Flatten the map against an itinerary snapshot: one entry per
    /// activity across every day, in day order then activity order,
    /// undecided entries included.
    pub fn summary(&self, itinerary: &Itinerary) -> Vec<ApprovalEntry> {
        let mut entries = Vec::with_capacity(itinerary.activity_count());
        for (di, day) in itinerary.days.iter().enumerate() {
            for (ai, act) in day.activities.iter().enumerate() {
                entries.push(ApprovalEntry {
                    day: di,
                    index: ai,
                    title: act.name.clone(),
                    decision: self.get(di, ai),
                });
            }
        }
        entries
    }
}

/// The editing session. Exactly one logical current itinerary exists per
/// session; components receive snapshots, never shared mutable access.
pub struct PlanningSession {
    planner: Box<dyn Planner>,
    user_id: Option<String>,
    itinerary: Option<Itinerary>,
    transcript: Vec<ChatMessage>,
    approvals: ApprovalMap,
    view: Option<ViewState>,
    generation: u64,
}

impl PlanningSession {
    pub fn new(planner: Box<dyn Planner>) -> Self {
        Self {
            planner,
            user_id: None,
            itinerary: None,
            transcript: Vec::new(),
            approvals: ApprovalMap::new(),
            view: None,
            generation: 0,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// The current itinerary snapshot, if one has been generated or loaded.
    pub fn current(&self) -> Option<&Itinerary> {
        self.itinerary.as_ref()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn approvals(&self) -> &ApprovalMap {
        &self.approvals
    }

    pub fn view(&self) -> Option<&ViewState> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut ViewState> {
        self.view.as_mut()
    }

    /// The token identifying the current snapshot. Captured before an
    /// external call; checked again when the response is applied.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Install an itinerary loaded from storage as the current snapshot.
    pub fn load(&mut self, itinerary: Itinerary) {
        self.install(itinerary);
    }

    fn install(&mut self, itinerary: Itinerary) {
        self.view = Some(ViewState::new(itinerary.start_date));
        self.itinerary = Some(itinerary);
        self.generation += 1;
    }

    /// Apply a planner-produced itinerary only if it belongs to the given
    /// generation. Returns `false` (state untouched) for a stale token --
    /// the caller navigated away or started a newer round in the meantime.
    pub fn apply_if_current(&mut self, generation: u64, itinerary: Itinerary) -> bool {
        if generation != self.generation {
            debug!(
                stale = generation,
                current = self.generation,
                "discarding stale planner response"
            );
            return false;
        }
        self.install(itinerary);
        true
    }

    /// Record an approval decision for the activity at `(day, index)` in
    /// the current snapshot. Same-value clicks reset to undecided.
    pub fn set_approval(&mut self, day: usize, index: usize, value: bool) {
        self.approvals.set(day, index, value);
    }

    pub fn approval(&self, day: usize, index: usize) -> Option<bool> {
        self.approvals.get(day, index)
    }

    /// Initial generation round: append the user's request to the
    /// transcript and ask the backend for an itinerary.
    pub async fn propose(&mut self, prompt: impl Into<String>) -> Result<PlanOutcome, SessionError> {
        self.transcript.push(ChatMessage::user(prompt));

        let request = PlanRequest {
            messages: self.transcript.clone(),
            approvals: None,
            previous_itinerary: self.itinerary.clone(),
            user_id: self.user_id.clone(),
        };

        let generation = self.generation;
        let response = self.planner.plan(&request).await?;
        Ok(self.apply_response(generation, response))
    }

    /// Regeneration round: flatten the approval decisions, send them with
    /// the transcript and the current snapshot, and replace the itinerary
    /// from the response.
    ///
    /// On success the approval map is cleared -- the new snapshot's
    /// positions no longer correspond to the old decisions. On backend
    /// failure the previous itinerary and approval map are retained
    /// unchanged.
    pub async fn regenerate(&mut self) -> Result<PlanOutcome, SessionError> {
        let itinerary = self.itinerary.as_ref().ok_or(SessionError::NoItinerary)?;

        let request = PlanRequest {
            messages: self.transcript.clone(),
            approvals: Some(self.approvals.summary(itinerary)),
            previous_itinerary: Some(itinerary.clone()),
            user_id: self.user_id.clone(),
        };

        let generation = self.generation;
        let response = match self.planner.plan(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "regeneration failed; keeping previous itinerary");
                return Err(err.into());
            }
        };
        Ok(self.apply_response(generation, response))
    }

    fn apply_response(&mut self, generation: u64, response: PlanResponse) -> PlanOutcome {
        match response {
            PlanResponse::Itinerary(itinerary) => {
                if !self.apply_if_current(generation, itinerary) {
                    return PlanOutcome::StaleDiscarded;
                }
                self.approvals.clear();
                info!(
                    generation = self.generation,
                    "itinerary replaced from planner response"
                );
                PlanOutcome::ItineraryReplaced
            }
            PlanResponse::Message(message) => {
                self.transcript.push(message);
                PlanOutcome::MessageAppended
            }
        }
    }

    /// Apply a calendar drag/resize to the owned snapshot, replacing it
    /// atomically.
    pub fn reschedule(
        &mut self,
        selector: ActivitySelector,
        new_start: chrono::DateTime<chrono::Utc>,
        new_end: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), SessionError> {
        let itinerary = self.itinerary.as_ref().ok_or(SessionError::NoItinerary)?;
        let next = calendar::reschedule_activity(itinerary, selector, new_start, new_end)?;
        self.itinerary = Some(next);
        Ok(())
    }

    /// Explicit "start over": clear itinerary, approvals, transcript, and
    /// view state. Bumps the generation so any in-flight response is
    /// discarded on arrival.
    pub fn reset_all(&mut self) {
        self.itinerary = None;
        self.transcript.clear();
        self.approvals.clear();
        self.view = None;
        self.generation += 1;
    }
}
