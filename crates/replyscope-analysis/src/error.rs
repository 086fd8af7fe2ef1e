use replyscope_core::InvariantViolation;
use thiserror::Error;

/// Errors returned by the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion endpoint answered with a non-2xx status.
    #[error("{message}")]
    Upstream { status_code: u16, message: String },

    /// The model's reply held no recoverable JSON document.
    #[error("model output is not valid JSON: {detail}")]
    MalformedOutput { detail: String },

    /// The document parsed but broke one or more schema rules.
    #[error("analysis failed validation: {}", join_violations(.0))]
    InvalidAnalysis(Vec<InvariantViolation>),

    /// The completion endpoint's response body could not be deserialized.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

fn join_violations(violations: &[InvariantViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
