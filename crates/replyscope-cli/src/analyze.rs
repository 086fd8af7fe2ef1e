//! `analyze` command: run the analysis pipeline over a saved scrape.

use std::path::Path;

use anyhow::Context;
use replyscope_analysis::{analyze_comments, AnalysisSettings, CompletionClient};
use replyscope_core::{loose_comments, AppConfig, CanonicalComment, ConfigError};
use serde_json::Value;

/// Splits the input document into its post URL (if any) and comments.
///
/// Accepts a scrape envelope or a bare array of comments. Comments are read
/// leniently, the same way the HTTP endpoint reads them.
fn parse_input(raw: &str) -> anyhow::Result<(Option<String>, Vec<CanonicalComment>)> {
    let input: Value = serde_json::from_str(raw).context("input is not valid JSON")?;
    match input {
        Value::Array(items) => Ok((None, loose_comments(&items))),
        Value::Object(mut envelope) => match envelope.remove("comments") {
            Some(Value::Array(items)) => {
                let url = envelope
                    .get("tweetUrl")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                Ok((url, loose_comments(&items)))
            }
            _ => anyhow::bail!("input envelope must carry a comments array"),
        },
        _ => anyhow::bail!("input must be a scrape envelope or an array of comments"),
    }
}

/// Analyzes the comments in `input` and prints the result to stdout.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, if
/// `ANTHROPIC_API_KEY` is missing, or if the analysis fails.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    input: &Path,
    url: Option<&str>,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let (envelope_url, comments) = parse_input(&raw)?;
    let source_url = url.map(str::to_owned).or(envelope_url);

    let key = config
        .anthropic_api_key
        .as_deref()
        .ok_or_else(|| ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".to_string()))?;
    let client = CompletionClient::from_app_config(config, key)?;
    let settings = AnalysisSettings::from_app_config(config);

    tracing::info!(count = comments.len(), "analyzing comments");
    let analysis = analyze_comments(&client, source_url.as_deref(), &comments, &settings).await?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_input_accepts_envelope() {
        let raw = r#"{
            "tweetUrl": "https://x.com/a/status/1",
            "totalComments": 1,
            "comments": [{ "id": "1", "text": "hola" }]
        }"#;
        let (url, comments) = parse_input(raw).expect("envelope");
        assert_eq!(url.as_deref(), Some("https://x.com/a/status/1"));
        assert_eq!(comments.len(), 1);
    }

    #[test]
    fn parse_input_accepts_bare_array() {
        let raw = r#"[{ "id": 7, "text": "hola", "likes": 3 }]"#;
        let (url, comments) = parse_input(raw).expect("array");
        assert!(url.is_none());
        assert_eq!(comments[0].id, "7");
        assert_eq!(comments[0].like_count, 3);
    }

    #[test]
    fn parse_input_tolerates_missing_id_and_null_counts() {
        let raw = r#"[{ "text": "hola", "followers": null }]"#;
        let (_, comments) = parse_input(raw).expect("array");
        assert_eq!(comments[0].id, "");
        assert_eq!(comments[0].follower_count, 0);
    }

    #[test]
    fn parse_input_rejects_other_shapes() {
        assert!(parse_input(r#"{ "comments": "nope" }"#).is_err());
        assert!(parse_input(r#""just text""#).is_err());
    }
}
