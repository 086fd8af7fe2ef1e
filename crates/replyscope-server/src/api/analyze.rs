use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use replyscope_analysis::analyze_comments;
use replyscope_core::{loose_comments, AnalysisResult};
use serde::Deserialize;
use serde_json::Value;

use super::{map_analysis_error, ApiError, AppState};
use crate::middleware::RequestId;

/// `comments` stays untyped until after the array check so a wrong shape
/// yields a specific message instead of a generic body rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeRequest {
    comments: Option<Value>,
    tweet_url: Option<String>,
}

/// `POST /api/tweet-analyze`: run the reply analysis over supplied comments.
pub(super) async fn tweet_analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let comments = match request.comments {
        Some(Value::Array(items)) => loose_comments(&items),
        _ => return Err(ApiError::bad_request("comments must be an array")),
    };

    let client = state
        .completion
        .as_deref()
        .ok_or_else(|| ApiError::missing_credential(&req_id.0, "ANTHROPIC_API_KEY"))?;

    analyze_comments(
        client,
        request.tweet_url.as_deref(),
        &comments,
        &state.analysis,
    )
    .await
    .map(Json)
    .map_err(|e| map_analysis_error(&req_id.0, &e))
}
