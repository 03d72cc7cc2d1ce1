//! Data types returned by the analysis pipeline.

use serde::{Deserialize, Serialize};

/// Sentiment headline plus a compassionate summary of the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub sentiment: String,
    pub summary: String,
}

/// How a plan step is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Title, short description, and an interactive breathing timer.
    Breathing,
    /// Plain title and description. Unknown kinds decode to this.
    #[default]
    #[serde(other)]
    Text,
}

/// One actionable item of the recovery plan.
///
/// `step` is a display label chosen by the model. It is neither unique nor
/// contiguous; position in [`AnalysisResult::plan`] is the only ordering
/// and identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub step: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: StepKind,
}

impl PlanStep {
    /// Whether this step renders the guided-breathing widget.
    pub fn is_breathing(&self) -> bool {
        self.kind == StepKind::Breathing
    }
}

/// A complete burnout analysis: always both halves, never one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis: Analysis,
    pub plan: Vec<PlanStep>,
}

impl AnalysisResult {
    /// Iterate over the breathing steps, with their plan positions.
    pub fn breathing_steps(&self) -> impl Iterator<Item = (usize, &PlanStep)> {
        self.plan.iter().enumerate().filter(|(_, s)| s.is_breathing())
    }
}
