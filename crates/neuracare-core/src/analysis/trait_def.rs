//! The two seams of the analysis pipeline.
//!
//! [`GenerativeBackend`] is the raw text-generation collaborator and may
//! fail. [`Analyzer`] is what the request controller talks to; it never
//! fails, because the adapter behind it absorbs every backend fault.

use async_trait::async_trait;

use super::error::GenerationError;
use super::types::AnalysisResult;

/// One structured-output generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Persona and task instruction.
    pub system_instruction: String,
    /// The single user turn.
    pub contents: String,
    /// JSON schema the response must conform to.
    pub response_schema: serde_json::Value,
}

/// A generative-text backend that answers with JSON text.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Identifier for logs (e.g. the model name).
    fn name(&self) -> &str;

    /// Request one generation and return the raw response text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Produces a burnout analysis for an entry.
///
/// Implementations must always return a well-formed result.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> AnalysisResult;
}

// Both traits are used as trait objects.
const _: () = {
    fn _assert_object_safe(_: &dyn GenerativeBackend, _: &dyn Analyzer) {}
};
