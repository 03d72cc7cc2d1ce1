//! Results view: the analysis, the plan, and feedback.
//!
//! Each breathing step owns its own [`PhaseTimer`]. Dropping the view drops
//! the timers, which cancels any scheduled transition.

use std::sync::Arc;

use crate::analysis::{AnalysisResult, PlanStep};
use crate::breathing::PhaseTimer;
use crate::feedback::{FeedbackPanel, PreferenceStore};

pub const PLAN_HEADING: &str = "Your Personalized Path to Recovery";
pub const DISCLAIMER: &str = "Disclaimer: NeuraCare provides suggestions and is not a substitute \
for professional medical advice. If you are in crisis, please contact a healthcare provider.";

/// One rendered plan step.
#[derive(Debug)]
pub struct StepCard {
    /// Position in the plan; the card's identity.
    pub position: usize,
    pub step: PlanStep,
    timer: Option<PhaseTimer>,
}

impl StepCard {
    /// Label shown in the step badge. Display only.
    pub fn badge(&self) -> String {
        self.step.step.to_string()
    }

    pub fn timer(&self) -> Option<&PhaseTimer> {
        self.timer.as_ref()
    }

    pub fn timer_mut(&mut self) -> Option<&mut PhaseTimer> {
        self.timer.as_mut()
    }
}

/// The mounted results view.
#[derive(Debug)]
pub struct ResultsView {
    result: Arc<AnalysisResult>,
    cards: Vec<StepCard>,
    feedback: FeedbackPanel,
}

impl ResultsView {
    /// Mount the view: build one card per plan step, in plan order, and
    /// read the stored feedback vote once.
    pub fn mount(result: Arc<AnalysisResult>, store: Arc<dyn PreferenceStore>) -> Self {
        let cards = result
            .plan
            .iter()
            .enumerate()
            .map(|(position, step)| StepCard {
                position,
                step: step.clone(),
                timer: step.is_breathing().then(PhaseTimer::new),
            })
            .collect();
        Self {
            result,
            cards,
            feedback: FeedbackPanel::mount(store),
        }
    }

    /// Whether this view shows exactly `result` (same allocation).
    pub fn shows(&self, result: &Arc<AnalysisResult>) -> bool {
        Arc::ptr_eq(&self.result, result)
    }

    pub fn sentiment(&self) -> &str {
        &self.result.analysis.sentiment
    }

    pub fn summary(&self) -> &str {
        &self.result.analysis.summary
    }

    pub fn cards(&self) -> &[StepCard] {
        &self.cards
    }

    pub fn card_mut(&mut self, position: usize) -> Option<&mut StepCard> {
        self.cards.get_mut(position)
    }

    pub fn feedback(&self) -> &FeedbackPanel {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut FeedbackPanel {
        &mut self.feedback
    }
}
