//! Analysis pipeline: prompt, completion, extraction, validation.

use replyscope_core::{AnalysisResult, AppConfig, CanonicalComment};

use crate::completion::CompletionClient;
use crate::error::AnalysisError;
use crate::extract::extract_json;
use crate::prompt::{build_prompt, DEFAULT_LANGUAGE};

/// Per-request knobs for [`analyze_comments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Language the model is told to write in.
    pub language: String,
    /// Reject documents that break the schema rules instead of logging them.
    pub strict: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            strict: true,
        }
    }
}

impl AnalysisSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            language: config.analysis_language.clone(),
            strict: config.analysis_strict,
        }
    }
}

/// Asks the model to analyze `comments` and returns the typed result.
///
/// # Errors
///
/// - [`AnalysisError::Upstream`] or [`AnalysisError::Http`] if the
///   completion call fails.
/// - [`AnalysisError::MalformedOutput`] if the reply holds no usable JSON.
/// - [`AnalysisError::InvalidAnalysis`] if `settings.strict` is set and the
///   document breaks a schema rule.
pub async fn analyze_comments(
    client: &CompletionClient,
    source_url: Option<&str>,
    comments: &[CanonicalComment],
    settings: &AnalysisSettings,
) -> Result<AnalysisResult, AnalysisError> {
    let prompt = build_prompt(source_url, comments, &settings.language);
    let raw = client.complete(&prompt).await?;

    let extraction = extract_json::<AnalysisResult>(&raw).inspect_err(|e| {
        tracing::error!(error = %e, chars = raw.len(), "model output rejected");
    })?;
    tracing::info!(
        count = comments.len(),
        outcome = ?extraction.outcome,
        "analysis extracted"
    );

    let analysis = extraction.value;
    let violations = analysis.validate();
    if violations.is_empty() {
        return Ok(analysis);
    }

    for violation in &violations {
        tracing::warn!(%violation, strict = settings.strict, "analysis invariant broken");
    }
    if settings.strict {
        Err(AnalysisError::InvalidAnalysis(violations))
    } else {
        Ok(analysis)
    }
}
