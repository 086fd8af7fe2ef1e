//! End-to-end scrape: submit, poll, fetch, normalize.

use replyscope_core::{AppConfig, ScrapeEnvelope};

use crate::client::RemoteJobClient;
use crate::error::JobError;
use crate::normalize::normalize_records;
use crate::poll::{PollPolicy, Sleeper};

/// Per-request knobs for [`scrape_thread`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeSettings {
    /// Upper bound on items the scraper collects.
    pub max_items: u32,
    /// Upper bound on records read back from the dataset.
    pub result_limit: u32,
    pub include_user_info: bool,
    pub poll: PollPolicy,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            max_items: 100,
            result_limit: 100,
            include_user_info: true,
            poll: PollPolicy::default(),
        }
    }
}

impl ScrapeSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_items: config.scrape_max_items,
            result_limit: config.scrape_result_limit,
            include_user_info: true,
            poll: PollPolicy::from_app_config(config),
        }
    }
}

/// Collects the replies of one post and returns them in canonical form.
///
/// Any records without an id or text are dropped, so `total_comments` can
/// be lower than the number of records the scraper returned.
///
/// # Errors
///
/// - [`JobError::Submission`] if the run cannot be started.
/// - [`JobError::JobFailed`] if the run fails or outlives the poll budget.
/// - [`JobError::Upstream`], [`JobError::Http`] or [`JobError::Deserialize`]
///   if a status or dataset request fails.
pub async fn scrape_thread<S: Sleeper>(
    client: &RemoteJobClient,
    tweet_url: &str,
    settings: &ScrapeSettings,
    sleeper: &S,
) -> Result<ScrapeEnvelope, JobError> {
    let run_id = client
        .submit(tweet_url, settings.max_items, settings.include_user_info)
        .await?;
    tracing::info!(%run_id, tweet_url, "scrape job submitted");

    let job = client
        .poll_until_terminal(&run_id, settings.poll, sleeper)
        .await?;

    let records = client.fetch_results(&job.id, settings.result_limit).await?;
    let comments = normalize_records(&records);
    tracing::info!(
        %run_id,
        records = records.len(),
        comments = comments.len(),
        polls = job.attempts_polled(),
        "scrape job complete"
    );

    Ok(ScrapeEnvelope::new(tweet_url, comments))
}
