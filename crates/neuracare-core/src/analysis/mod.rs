//! Analysis pipeline: from entry text to a burnout analysis.
//!
//! ```text
//! RequestController
//!     |
//!     v
//! &dyn Analyzer --analyze(text)--> AnalysisResult   (infallible)
//!     |
//! BurnoutAnalyzer
//!     |  prompt::build_request(text)
//!     v
//! &dyn GenerativeBackend --generate(request)--> Result<String, GenerationError>
//!     |
//! GeminiBackend (HTTP)
//! ```
//!
//! [`BurnoutAnalyzer`] is the single point where faults are absorbed: a
//! transport error, an HTTP error, an empty or malformed response all end
//! in the fixed [`fallback_result`].

pub mod analyzer;
pub mod error;
pub mod gemini;
pub mod prompt;
pub mod trait_def;
pub mod types;

pub use analyzer::{BurnoutAnalyzer, fallback_result, parse_response};
pub use error::{AnalysisFault, GenerationError};
pub use gemini::GeminiBackend;
pub use trait_def::{Analyzer, GenerationRequest, GenerativeBackend};
pub use types::{Analysis, AnalysisResult, PlanStep, StepKind};
