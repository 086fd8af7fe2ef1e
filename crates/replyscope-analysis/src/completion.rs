//! Client for the Anthropic Messages API.
//!
//! Sends one user message and returns the concatenated text of the reply.
//! Nothing is parsed beyond the response envelope; see [`crate::extract`].

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Text-completion client bound to one model and output limit.
pub struct CompletionClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl CompletionClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        model: &str,
        max_tokens: u32,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, AnalysisError> {
        Self::with_base_url(
            api_key,
            model,
            max_tokens,
            timeout_secs,
            user_agent,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        max_tokens: u32,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            max_tokens,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Builds a client from the process configuration and an already
    /// resolved API key.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn from_app_config(
        config: &replyscope_core::AppConfig,
        api_key: &str,
    ) -> Result<Self, AnalysisError> {
        Self::with_base_url(
            api_key,
            &config.anthropic_model,
            config.anthropic_max_tokens,
            config.http_timeout_secs,
            &config.user_agent,
            &config.anthropic_base_url,
        )
    }

    /// Sends `prompt` as a single user message and returns the reply text.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::Upstream`] on a non-2xx response, carrying the
    ///   endpoint's own error message when it sent one.
    /// - [`AnalysisError::Http`] on network failure.
    /// - [`AnalysisError::Deserialize`] if the body is not a message.
    pub async fn complete(&self, prompt: &str) -> Result<String, AnalysisError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status_code, message) = error_message(response).await;
            tracing::warn!(status = status_code, %message, "completion request rejected");
            return Err(AnalysisError::Upstream {
                status_code,
                message,
            });
        }

        let body = response.text().await?;
        let reply: MessagesResponse =
            serde_json::from_str(&body).map_err(|e| AnalysisError::Deserialize {
                context: "messages response".to_string(),
                source: e,
            })?;

        let text: String = reply
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect();
        tracing::debug!(model = %self.model, chars = text.len(), "completion received");
        Ok(text)
    }
}

async fn error_message(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Anthropic error {status}"));
    (status, message)
}
