//! By-capital search page state
//!
//! Pure state machine behind the search page. The shell owns an instance,
//! drives the transitions around the HTTP call and publishes snapshots to
//! its subscribers.
//!
//! ```text
//! Idle ──begin──▶ Searching ──success──▶ Success
//!                     │   ▲                 │
//!                     │   └─────begin───────┤
//!                     └──failure──▶ Failed ─┘
//! ```

use serde::Serialize;

use crate::country::Country;

/// User-facing message shown when a search fails
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching countries";

/// Lifecycle phase of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPhase {
    Idle,
    Searching,
    Success,
    Failed,
}

/// Observable state of the by-capital page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    is_loading: bool,
    is_error: Option<String>,
    countries: Vec<Country>,
    phase: SearchPhase,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            is_loading: false,
            is_error: None,
            countries: Vec::new(),
            phase: SearchPhase::Idle,
        }
    }
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_error(&self) -> Option<&str> {
        self.is_error.as_deref()
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Enter the `Searching` phase
    ///
    /// Returns `false` and leaves the state untouched when a search is
    /// already in flight. At most one search runs per page.
    pub fn begin_search(&mut self) -> bool {
        if self.is_loading {
            return false;
        }

        self.is_loading = true;
        self.is_error = None;
        self.phase = SearchPhase::Searching;
        true
    }

    /// Apply the result of a successful search
    pub fn complete_success(&mut self, countries: Vec<Country>) {
        self.is_loading = false;
        self.is_error = None;
        self.countries = countries;
        self.phase = SearchPhase::Success;
    }

    /// Apply a failed search; previous results are kept
    pub fn complete_failure(&mut self, message: impl Into<String>) {
        self.is_loading = false;
        self.is_error = Some(message.into());
        self.phase = SearchPhase::Failed;
    }
}
