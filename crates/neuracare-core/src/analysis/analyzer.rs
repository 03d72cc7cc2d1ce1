//! The burnout analyzer: prompt, generate, parse, and absorb faults.
//!
//! This is the only place analysis faults are handled. Anything that goes
//! wrong between the request and a complete [`AnalysisResult`] is logged
//! and replaced with [`fallback_result`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::AnalysisFault;
use super::prompt;
use super::trait_def::{Analyzer, GenerativeBackend};
use super::types::{Analysis, AnalysisResult, PlanStep, StepKind};

/// [`Analyzer`] backed by a [`GenerativeBackend`].
#[derive(Clone)]
pub struct BurnoutAnalyzer {
    backend: Arc<dyn GenerativeBackend>,
}

impl std::fmt::Debug for BurnoutAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BurnoutAnalyzer")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl BurnoutAnalyzer {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Run one analysis without the fallback.
    pub async fn try_analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisFault> {
        let request = prompt::build_request(text);
        let raw = self.backend.generate(&request).await?;
        parse_response(&raw)
    }
}

#[async_trait]
impl Analyzer for BurnoutAnalyzer {
    async fn analyze(&self, text: &str) -> AnalysisResult {
        match self.try_analyze(text).await {
            Ok(result) => {
                debug!(
                    backend = self.backend.name(),
                    steps = result.plan.len(),
                    "analysis parsed"
                );
                result
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "analysis failed, using fallback");
                fallback_result()
            }
        }
    }
}

/// Parse the backend's JSON text into a complete result.
///
/// Both `analysis` and `plan` must be present and non-null; a response
/// carrying only one of them is rejected rather than half-filled.
pub fn parse_response(raw: &str) -> Result<AnalysisResult, AnalysisFault> {
    let value: serde_json::Value = serde_json::from_str(raw.trim())?;

    let present = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
    if !present("analysis") || !present("plan") {
        return Err(AnalysisFault::MissingFields);
    }

    Ok(serde_json::from_value(value)?)
}

/// The fixed result shown when an analysis cannot be produced.
pub fn fallback_result() -> AnalysisResult {
    AnalysisResult {
        analysis: Analysis {
            sentiment: "Analysis Error".to_string(),
            summary: "We're sorry, but we couldn't process your request at the moment. Please try \
                      again later. It's important to reach out to a healthcare professional if you \
                      are feeling overwhelmed."
                .to_string(),
        },
        plan: vec![PlanStep {
            step: 1,
            title: "Take a Deep Breath".to_string(),
            description: "Sometimes technology fails, but your breath is always there for you. \
                          Take a moment to inhale slowly, hold for a few seconds, and exhale \
                          completely. Repeat a few times to center yourself."
                .to_string(),
            kind: StepKind::Breathing,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "analysis": {"sentiment": "Signs of Emotional Exhaustion", "summary": "You sound worn out."},
        "plan": [
            {"step": 1, "title": "Mindful Breathing", "description": "Breathe.", "type": "breathing"},
            {"step": 2, "title": "Digital Sunset", "description": "Screens off at nine."}
        ]
    }"#;

    #[test]
    fn parses_complete_response() {
        let result = parse_response(VALID).unwrap();
        assert_eq!(result.analysis.sentiment, "Signs of Emotional Exhaustion");
        assert_eq!(result.plan.len(), 2);
        assert_eq!(result.plan[0].kind, StepKind::Breathing);
        assert_eq!(result.plan[1].kind, StepKind::Text);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let padded = format!("\n  {VALID}  \n");
        assert!(parse_response(&padded).is_ok());
    }

    #[test]
    fn rejects_when_both_fields_missing() {
        let err = parse_response(r#"{"message": "hi"}"#).unwrap_err();
        assert!(matches!(err, AnalysisFault::MissingFields));
    }

    #[test]
    fn rejects_half_populated_response() {
        let only_analysis = r#"{"analysis": {"sentiment": "a", "summary": "b"}}"#;
        assert!(matches!(
            parse_response(only_analysis).unwrap_err(),
            AnalysisFault::MissingFields
        ));

        let null_plan = r#"{"analysis": {"sentiment": "a", "summary": "b"}, "plan": null}"#;
        assert!(matches!(
            parse_response(null_plan).unwrap_err(),
            AnalysisFault::MissingFields
        ));
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_response("Sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, AnalysisFault::Malformed(_)));
    }

    #[test]
    fn rejects_wrongly_shaped_fields() {
        let err = parse_response(r#"{"analysis": "fine", "plan": []}"#).unwrap_err();
        assert!(matches!(err, AnalysisFault::Malformed(_)));
    }

    #[test]
    fn fallback_has_single_breathing_step() {
        let fallback = fallback_result();
        assert_eq!(fallback.analysis.sentiment, "Analysis Error");
        assert_eq!(fallback.plan.len(), 1);
        assert!(fallback.plan[0].is_breathing());
        assert_eq!(fallback.plan[0].title, "Take a Deep Breath");
    }
}
