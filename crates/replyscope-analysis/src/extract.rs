//! Recovery of a JSON document from free-form model output.
//!
//! Models wrap JSON in code fences, surround it with prose, and leave
//! trailing commas. Extraction runs a fixed sequence:
//!
//! 1. strip every fence marker (bare or language-tagged) and trim;
//! 2. keep the span from the first `{` to the last `}`, or the whole text
//!    when either brace is missing or they are out of order;
//! 3. parse strictly;
//! 4. on failure, drop separators that directly precede `}` or `]` and
//!    parse once more.
//!
//! No semantic checks happen here; see [`replyscope_core::AnalysisResult::validate`].

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::AnalysisError;

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+-]*[ \t]*\r?\n?").expect("valid regex"));

static TRAILING_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

/// How a document was recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The located span parsed as-is.
    Parsed,
    /// The span parsed only after trailing separators were removed.
    RepairedParse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub value: T,
    pub outcome: ParseOutcome,
}

/// Recovers a `T` from raw model output.
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedOutput`] when neither the strict nor the
/// repaired parse succeeds. The detail is the strict parse failure, which
/// points at the original text rather than the repaired one.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<Extraction<T>, AnalysisError> {
    let stripped = strip_fences(raw);
    let candidate = locate_object(&stripped);

    let strict_err = match serde_json::from_str::<T>(candidate) {
        Ok(value) => {
            return Ok(Extraction {
                value,
                outcome: ParseOutcome::Parsed,
            })
        }
        Err(e) => e,
    };

    let repaired = remove_trailing_separators(candidate);
    if repaired != candidate {
        if let Ok(value) = serde_json::from_str::<T>(&repaired) {
            tracing::debug!("model output parsed after trailing separator repair");
            return Ok(Extraction {
                value,
                outcome: ParseOutcome::RepairedParse,
            });
        }
    }

    Err(AnalysisError::MalformedOutput {
        detail: strict_err.to_string(),
    })
}

fn strip_fences(raw: &str) -> String {
    FENCE_RE.replace_all(raw, "").trim().to_owned()
}

fn locate_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

fn remove_trailing_separators(text: &str) -> String {
    TRAILING_SEPARATOR_RE.replace_all(text, "$1").into_owned()
}
