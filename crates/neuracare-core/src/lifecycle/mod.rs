//! Request lifecycle controller: owns the entry, validates it, and runs at
//! most one analysis at a time.
//!
//! ```text
//!            set_text / submit (invalid, busy, blank: no-op)
//!           +---------+
//!           v         |
//!      Composing -----+
//!           |  submit (valid) -> in_flight
//!           v
//!      analyze(text).await
//!           |  generation still current
//!           v
//!       Results --reset--> Composing
//! ```
//!
//! Every [`RequestController::reset`] bumps a generation counter. A
//! submission only applies its result if the generation it started under is
//! still current, so an answer that arrives after a reset or sign-out is
//! dropped instead of re-opening the results view.
//!
//! A reset hides the in-flight indicator but does not cancel the call
//! itself. Until that call returns, further submissions are `Busy`: the
//! analyzer never sees two calls from one controller at once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::analysis::{AnalysisResult, Analyzer};
use crate::validation::{EntryError, validate};

/// Which screen the controller is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Composing,
    Results,
}

/// What a call to [`RequestController::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The analysis finished and the results view is showing.
    Completed,
    /// Another submission is in flight; nothing happened.
    Busy,
    /// The entry failed validation; the error is now shown.
    Invalid(EntryError),
    /// The entry is empty after trimming; nothing happened.
    Blank,
    /// The analysis finished after a reset and was discarded.
    Superseded,
}

/// Point-in-time copy of the controller state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSnapshot {
    pub text: String,
    pub validation_error: Option<EntryError>,
    pub in_flight: bool,
    pub result: Option<Arc<AnalysisResult>>,
    pub view: View,
}

#[derive(Debug)]
struct State {
    text: String,
    validation_error: Option<EntryError>,
    in_flight: bool,
    /// An analyzer call is running, whether or not it is still current.
    /// Survives `reset`.
    outstanding: bool,
    result: Option<Arc<AnalysisResult>>,
    view: View,
    generation: u64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            text: String::new(),
            validation_error: None,
            in_flight: false,
            outstanding: false,
            result: None,
            view: View::Composing,
            generation: 0,
        }
    }
}

/// The request lifecycle controller.
///
/// Cloning yields another handle to the same controller, so a UI can hold
/// one handle for input events while a submission is being awaited on
/// another.
#[derive(Clone)]
pub struct RequestController {
    analyzer: Arc<dyn Analyzer>,
    state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for RequestController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestController")
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl RequestController {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            analyzer,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // State is plain data; a panic elsewhere cannot leave it half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the entry text.
    ///
    /// Validation is live only once an error is showing: while one is set
    /// the new text is re-validated immediately, otherwise errors wait for
    /// the next submit.
    pub fn set_text(&self, text: impl Into<String>) {
        let mut state = self.lock();
        state.text = text.into();
        if state.validation_error.is_some() {
            state.validation_error = validate(&state.text).err();
        }
    }

    /// Validate and analyze the current entry.
    ///
    /// Busy, invalid, and blank submissions are silent no-ops reported via
    /// the returned [`SubmitOutcome`]; none of them reaches the analyzer.
    pub async fn submit(&self) -> SubmitOutcome {
        let (generation, text) = {
            let mut state = self.lock();
            if state.in_flight || state.outstanding {
                debug!(
                    generation = state.generation,
                    superseded = !state.in_flight,
                    "submit ignored, analysis in flight"
                );
                return SubmitOutcome::Busy;
            }
            if let Err(e) = validate(&state.text) {
                debug!(error = ?e, "submit rejected by validation");
                state.validation_error = Some(e);
                return SubmitOutcome::Invalid(e);
            }
            state.validation_error = None;

            let trimmed = state.text.trim();
            if trimmed.is_empty() {
                return SubmitOutcome::Blank;
            }
            let trimmed = trimmed.to_string();
            state.in_flight = true;
            state.outstanding = true;
            (state.generation, trimmed)
        };

        info!(
            generation = generation,
            chars = text.chars().count(),
            "analysis submitted"
        );

        let _flight = InFlight {
            state: &self.state,
            generation,
        };
        let result = self.analyzer.analyze(&text).await;

        let mut state = self.lock();
        if state.generation != generation {
            info!(
                generation = generation,
                current = state.generation,
                "analysis superseded by reset, discarding result"
            );
            return SubmitOutcome::Superseded;
        }
        info!(
            generation = generation,
            steps = result.plan.len(),
            "analysis completed"
        );
        state.result = Some(Arc::new(result));
        state.view = View::Results;
        SubmitOutcome::Completed
    }

    /// Return to an empty composing view and invalidate any submission
    /// still in flight. Its analyzer call keeps the controller busy until
    /// it returns.
    pub fn reset(&self) {
        let mut state = self.lock();
        let generation = state.generation.wrapping_add(1);
        let outstanding = state.outstanding;
        *state = State {
            generation,
            outstanding,
            ..State::default()
        };
        debug!(generation = generation, "controller reset");
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let state = self.lock();
        ControllerSnapshot {
            text: state.text.clone(),
            validation_error: state.validation_error,
            in_flight: state.in_flight,
            result: state.result.clone(),
            view: state.view,
        }
    }

    pub fn view(&self) -> View {
        self.lock().view
    }

    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    pub fn validation_error(&self) -> Option<EntryError> {
        self.lock().validation_error
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().in_flight
    }

    /// Whether an analyzer call is running, including one discarded by a
    /// reset.
    pub fn is_busy(&self) -> bool {
        let state = self.lock();
        state.in_flight || state.outstanding
    }

    pub fn result(&self) -> Option<Arc<AnalysisResult>> {
        self.lock().result.clone()
    }
}

/// Marks the analyzer call finished when a submission ends, including when
/// its future is dropped mid-await. Clears `in_flight` only for the
/// generation that set it.
struct InFlight<'a> {
    state: &'a Mutex<State>,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.outstanding = false;
        if state.generation == self.generation {
            state.in_flight = false;
        }
    }
}
