//! "Was this analysis helpful?" feedback.
//!
//! One vote is kept under a fixed key in an injected [`PreferenceStore`].
//! Store failures are logged and otherwise ignored: feedback is never worth
//! an error message.

pub mod store;

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, warn};

pub use store::{FileStore, MemoryStore, PreferenceStore, StoreError};

/// Key the vote is stored under.
pub const FEEDBACK_KEY: &str = "neuraCareFeedback";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackVote {
    Up,
    Down,
}

impl FeedbackVote {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::fmt::Display for FeedbackVote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feedback vote: {0:?}")]
pub struct UnknownVote(pub String);

impl FromStr for FeedbackVote {
    type Err = UnknownVote;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(UnknownVote(other.to_string())),
        }
    }
}

/// Read the stored vote. Unreadable or unrecognized values count as no vote.
pub fn get_feedback(store: &dyn PreferenceStore) -> Option<FeedbackVote> {
    match store.get(FEEDBACK_KEY) {
        Ok(Some(raw)) => match raw.parse() {
            Ok(vote) => Some(vote),
            Err(e) => {
                warn!(error = %e, "ignoring stored feedback");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "could not read feedback");
            None
        }
    }
}

/// Persist a vote, overwriting any previous one. Failures are logged.
pub fn set_feedback(store: &dyn PreferenceStore, vote: FeedbackVote) {
    if let Err(e) = store.set(FEEDBACK_KEY, vote.as_str()) {
        warn!(error = %e, vote = %vote, "could not save feedback");
    }
}

/// Feedback controls of one results view.
///
/// The stored vote is read once, at mount. Once a vote is showing, the
/// controls are replaced by a thank-you message and further votes on this
/// mount are ignored.
pub struct FeedbackPanel {
    store: Arc<dyn PreferenceStore>,
    vote: Option<FeedbackVote>,
}

impl std::fmt::Debug for FeedbackPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackPanel")
            .field("vote", &self.vote)
            .finish_non_exhaustive()
    }
}

impl FeedbackPanel {
    pub const PROMPT: &str = "Was this analysis helpful?";
    pub const THANK_YOU: &str = "Thank you for your feedback!";

    pub fn mount(store: Arc<dyn PreferenceStore>) -> Self {
        let vote = get_feedback(store.as_ref());
        Self { store, vote }
    }

    /// The vote currently showing, if any.
    pub fn vote(&self) -> Option<FeedbackVote> {
        self.vote
    }

    /// Whether the up/down controls are showing.
    pub fn accepts_vote(&self) -> bool {
        self.vote.is_none()
    }

    /// Text to show in place of, or above, the controls.
    pub fn message(&self) -> &'static str {
        if self.accepts_vote() {
            Self::PROMPT
        } else {
            Self::THANK_YOU
        }
    }

    /// Record a vote. Returns `false` if a vote was already showing.
    pub fn cast(&mut self, vote: FeedbackVote) -> bool {
        if !self.accepts_vote() {
            debug!(vote = %vote, "feedback already recorded, ignoring");
            return false;
        }
        self.vote = Some(vote);
        set_feedback(self.store.as_ref(), vote);
        true
    }
}
