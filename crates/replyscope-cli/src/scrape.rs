//! `scrape` command: run the scrape pipeline and print the envelope.

use replyscope_core::{AppConfig, ConfigError};
use replyscope_jobs::{scrape_thread, RemoteJobClient, ScrapeSettings, TokioSleeper};

/// Scrapes the replies to `url` and prints the envelope to stdout.
///
/// # Errors
///
/// Returns an error if `APIFY_API_TOKEN` is missing or any step of the
/// scrape fails.
pub(crate) async fn run_scrape(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let token = config
        .apify_api_token
        .as_deref()
        .ok_or_else(|| ConfigError::MissingEnvVar("APIFY_API_TOKEN".to_string()))?;

    let client = RemoteJobClient::from_app_config(config, token)?;
    let settings = ScrapeSettings::from_app_config(config);

    let envelope = scrape_thread(&client, url, &settings, &TokioSleeper).await?;
    tracing::info!(comments = envelope.total_comments, "scrape finished");

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
