//! Explicit finite view state for the calendar: week/day granularity, the
//! visible-range anchor date, fullscreen, and the single open activity
//! detail. Purely presentational; none of this touches the itinerary.

use chrono::{Days, NaiveDate};

use super::ActivitySelector;

/// Calendar granularity. Month view is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    Day,
    #[default]
    Week,
}

/// The calendar's presentational state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub mode: ViewMode,
    /// Anchor date for the visible range.
    pub current_date: NaiveDate,
    pub fullscreen: bool,
    /// At most one activity is open for detail view.
    pub selected_activity: Option<ActivitySelector>,
    /// The itinerary start date, kept for "jump to start".
    start_date: NaiveDate,
}

impl ViewState {
    /// Initial state: week view anchored at the itinerary's start date.
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            mode: ViewMode::Week,
            current_date: start_date,
            fullscreen: false,
            selected_activity: None,
            start_date,
        }
    }

    /// Selecting an empty calendar slot focuses that date in day view.
    /// Non-mutating with respect to the itinerary: no activity is created.
    pub fn select_slot(&mut self, date: NaiveDate) {
        self.mode = ViewMode::Day;
        self.current_date = date;
    }

    /// Explicit "back to week" action.
    pub fn back_to_week(&mut self) {
        self.mode = ViewMode::Week;
    }

    /// Advance the visible week.
    pub fn next_week(&mut self) {
        self.current_date = self.current_date + Days::new(7);
    }

    /// Rewind the visible week.
    pub fn prev_week(&mut self) {
        self.current_date = self.current_date - Days::new(7);
    }

    /// Reset the anchor to the itinerary's start date.
    pub fn jump_to_start(&mut self) {
        self.current_date = self.start_date;
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    /// Open an activity's detail view, replacing any previous selection.
    pub fn open_activity(&mut self, selector: ActivitySelector) {
        self.selected_activity = Some(selector);
    }

    pub fn close_activity(&mut self) {
        self.selected_activity = None;
    }
}
