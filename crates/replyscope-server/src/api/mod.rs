mod analyze;
mod scrape;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use replyscope_analysis::{AnalysisError, AnalysisSettings, CompletionClient};
use replyscope_core::AppConfig;
use replyscope_jobs::{JobError, RemoteJobClient, ScrapeSettings};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::middleware::request_id;

const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// Shared handler state. Upstream clients are `None` when their credential
/// is not configured; the matching route then answers 500.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Option<Arc<RemoteJobClient>>,
    pub completion: Option<Arc<CompletionClient>>,
    pub scrape: ScrapeSettings,
    pub analysis: AnalysisSettings,
}

impl AppState {
    /// Builds both upstream clients once from the loaded configuration.
    pub fn from_app_config(config: &AppConfig) -> anyhow::Result<Self> {
        let jobs = match config.apify_api_token.as_deref() {
            Some(token) => Some(Arc::new(RemoteJobClient::from_app_config(config, token)?)),
            None => {
                tracing::warn!("APIFY_API_TOKEN not set; scrape requests will fail");
                None
            }
        };

        let completion = match config.anthropic_api_key.as_deref() {
            Some(key) => Some(Arc::new(CompletionClient::from_app_config(config, key)?)),
            None => {
                tracing::warn!("ANTHROPIC_API_KEY not set; analyze requests will fail");
                None
            }
        };

        Ok(Self {
            jobs,
            completion,
            scrape: ScrapeSettings::from_app_config(config),
            analysis: AnalysisSettings::from_app_config(config),
        })
    }
}

/// Flat error body shared by every route: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn missing_credential(request_id: &str, var: &str) -> Self {
        tracing::error!(request_id, var, "upstream credential not configured");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{var} is not configured"),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub(super) fn map_job_error(request_id: &str, error: &JobError) -> ApiError {
    tracing::error!(request_id, error = %error, "scrape failed");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

pub(super) fn map_analysis_error(request_id: &str, error: &AnalysisError) -> ApiError {
    tracing::error!(request_id, error = %error, "analysis failed");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health).fallback(method_not_allowed))
        .route(
            "/api/tweet-scrape",
            post(scrape::tweet_scrape).fallback(method_not_allowed),
        )
        .route(
            "/api/tweet-analyze",
            post(analyze::tweet_analyze).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(ALLOWED_METHODS),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("content-type"),
                ))
                .layer(build_cors()),
        )
        .with_state(state)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

async fn health() -> Json<HealthData> {
    Json(HealthData { status: "ok" })
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not found")
}
