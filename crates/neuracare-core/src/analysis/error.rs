//! Analysis fault taxonomy. Never shown to the user verbatim.

/// A failure of the generative backend itself.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend returned no text")]
    EmptyResponse,
}

/// Why a generation could not be turned into an [`super::AnalysisResult`].
#[derive(Debug, thiserror::Error)]
pub enum AnalysisFault {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("response is not valid analysis JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response is missing the analysis and plan fields")]
    MissingFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let status = GenerationError::Status {
            status: 429,
            body: "quota".to_string(),
        };
        assert_eq!(status.to_string(), "backend returned HTTP 429: quota");

        let fault = AnalysisFault::from(GenerationError::EmptyResponse);
        assert_eq!(fault.to_string(), "backend returned no text");

        assert_eq!(
            AnalysisFault::MissingFields.to_string(),
            "response is missing the analysis and plan fields"
        );
    }
}
