use serde::{Deserialize, Serialize};

/// Input document for the tweet scraper actor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeInput {
    pub start_urls: Vec<String>,
    pub max_items: u32,
    pub add_user_info: bool,
}

/// Envelope wrapping every job-runner response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Run metadata as returned by the submit endpoint. The id is optional here
/// so that a missing id surfaces as a submission error, not a decode error.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedRun {
    pub id: Option<String>,
}

/// Run metadata as returned by the status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RunStatus {
    pub status: String,
}

/// Error envelope the job runner uses for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: Option<String>,
}
