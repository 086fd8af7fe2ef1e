use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use replyscope_core::ScrapeEnvelope;
use replyscope_jobs::{scrape_thread, TokioSleeper};
use serde::Deserialize;

use super::{map_job_error, ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ScrapeRequest {
    tweet_url: Option<String>,
}

/// `POST /api/tweet-scrape`: collect and normalize the replies to one post.
pub(super) async fn tweet_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeEnvelope>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let tweet_url = request
        .tweet_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::bad_request("tweetUrl is required"))?;

    let client = state
        .jobs
        .as_deref()
        .ok_or_else(|| ApiError::missing_credential(&req_id.0, "APIFY_API_TOKEN"))?;

    scrape_thread(client, tweet_url, &state.scrape, &TokioSleeper)
        .await
        .map(Json)
        .map_err(|e| map_job_error(&req_id.0, &e))
}
