//! HTTP client for the job runner's REST API.
//!
//! Covers the three calls a scrape needs: start an actor run, read its
//! status, and read the run's default dataset. The API token travels as a
//! bearer header so it never appears in a URL or a log line.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::JobError;
use crate::poll::{self, JobStatus, PollPolicy, RemoteJob, Sleeper};
use crate::types::{ApiResponse, ErrorEnvelope, RunStatus, ScrapeInput, SubmittedRun};

pub const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2";

/// Client for one job-runner actor.
///
/// Use [`RemoteJobClient::new`] for production or
/// [`RemoteJobClient::with_base_url`] to point at a mock server in tests.
pub struct RemoteJobClient {
    client: Client,
    token: String,
    actor_id: String,
    base_url: String,
}

impl RemoteJobClient {
    /// Creates a client pointed at the production job-runner API.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        token: &str,
        actor_id: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, JobError> {
        Self::with_base_url(token, actor_id, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        token: &str,
        actor_id: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, JobError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            token: token.to_owned(),
            actor_id: actor_id.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Builds a client from the process configuration and an already
    /// resolved token.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn from_app_config(
        config: &replyscope_core::AppConfig,
        token: &str,
    ) -> Result<Self, JobError> {
        Self::with_base_url(
            token,
            &config.apify_actor_id,
            config.http_timeout_secs,
            &config.user_agent,
            &config.apify_base_url,
        )
    }

    /// Starts a scrape run for `target_url` and returns the run id.
    ///
    /// # Errors
    ///
    /// - [`JobError::Submission`] if the runner answers non-2xx or the
    ///   response carries no run id.
    /// - [`JobError::Http`] on network failure.
    /// - [`JobError::Deserialize`] if the body is not the expected envelope.
    pub async fn submit(
        &self,
        target_url: &str,
        max_items: u32,
        include_user_info: bool,
    ) -> Result<String, JobError> {
        let input = ScrapeInput {
            start_urls: vec![target_url.to_owned()],
            max_items,
            add_user_info: include_user_info,
        };

        let url = format!("{}/acts/{}/runs", self.base_url, self.actor_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&input)
            .send()
            .await?;

        if !response.status().is_success() {
            let (_, message) = error_message(response).await;
            return Err(JobError::Submission(message));
        }

        let envelope: ApiResponse<SubmittedRun> = read_json(response, "submit run").await?;
        envelope
            .data
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| JobError::Submission("job runner returned no run id".to_string()))
    }

    /// Reads the current status of a run.
    ///
    /// # Errors
    ///
    /// - [`JobError::Upstream`] on a non-2xx response.
    /// - [`JobError::Http`] on network failure.
    /// - [`JobError::Deserialize`] if the body is not the expected envelope.
    pub async fn job_status(&self, run_id: &str) -> Result<JobStatus, JobError> {
        let url = format!("{}/actor-runs/{run_id}", self.base_url);
        let response = self.client.get(&url).bearer_auth(&self.token).send().await?;

        if !response.status().is_success() {
            let (status, message) = error_message(response).await;
            return Err(JobError::Upstream { status, message });
        }

        let envelope: ApiResponse<RunStatus> =
            read_json(response, &format!("run status({run_id})")).await?;
        Ok(JobStatus::from_runner(&envelope.data.status))
    }

    /// Polls the run until it is terminal or `policy` is exhausted.
    ///
    /// # Errors
    ///
    /// See [`poll::poll_until_terminal`].
    pub async fn poll_until_terminal<S: Sleeper>(
        &self,
        run_id: &str,
        policy: PollPolicy,
        sleeper: &S,
    ) -> Result<RemoteJob, JobError> {
        poll::poll_until_terminal(run_id, policy, sleeper, || self.job_status(run_id)).await
    }

    /// Reads up to `limit` raw records from the run's default dataset.
    ///
    /// Records are returned untouched; see [`crate::normalize`] for the
    /// mapping into canonical comments.
    ///
    /// # Errors
    ///
    /// - [`JobError::Upstream`] on a non-2xx response.
    /// - [`JobError::Http`] on network failure.
    /// - [`JobError::Deserialize`] if the body is not a JSON array.
    pub async fn fetch_results(
        &self,
        run_id: &str,
        limit: u32,
    ) -> Result<Vec<serde_json::Value>, JobError> {
        let url = format!("{}/actor-runs/{run_id}/dataset/items", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("limit", limit.to_string()), ("format", "json".to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = error_message(response).await;
            return Err(JobError::Upstream { status, message });
        }

        read_json(response, &format!("dataset items({run_id})")).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, JobError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| JobError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Extracts the runner's own error message from a failed response, falling
/// back to a status-coded message when the body is not the error envelope.
async fn error_message(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("job runner returned HTTP {status}"));
    (status, message)
}
