//! Core of the NeuraCare burnout check-in.
//!
//! A signed-in user writes how they feel, the entry is validated and sent
//! once to a generative backend, and the structured answer is shown as a
//! recovery plan. Plan steps of kind `breathing` carry an interactive
//! guided-breathing timer.
//!
//! ```text
//! App
//!  |-- SessionContext <-- IdentityProvider::subscribe()
//!  |-- RequestController --submit()--> Analyzer::analyze()
//!  |                                      |
//!  |                                 BurnoutAnalyzer --generate()--> GenerativeBackend
//!  `-- ResultsView
//!        |-- StepCard (PhaseTimer for breathing steps)
//!        `-- FeedbackPanel --> PreferenceStore
//! ```

pub mod analysis;
pub mod app;
pub mod breathing;
pub mod config;
pub mod feedback;
pub mod lifecycle;
pub mod logging;
pub mod results;
pub mod session;
pub mod validation;
