use std::net::SocketAddr;
use std::time::Duration;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub apify_api_token: Option<String>,
    pub apify_base_url: String,
    pub apify_actor_id: String,
    pub scrape_max_items: u32,
    pub scrape_result_limit: u32,
    pub poll_interval_ms: u64,
    pub poll_max_attempts: u32,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub anthropic_model: String,
    pub anthropic_max_tokens: u32,
    pub analysis_language: String,
    pub analysis_strict: bool,
}

impl AppConfig {
    /// Sleep between two status checks of a remote job.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field(
                "apify_api_token",
                &self.apify_api_token.as_ref().map(|_| "[redacted]"),
            )
            .field("apify_base_url", &self.apify_base_url)
            .field("apify_actor_id", &self.apify_actor_id)
            .field("scrape_max_items", &self.scrape_max_items)
            .field("scrape_result_limit", &self.scrape_result_limit)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("anthropic_base_url", &self.anthropic_base_url)
            .field("anthropic_model", &self.anthropic_model)
            .field("anthropic_max_tokens", &self.anthropic_max_tokens)
            .field("analysis_language", &self.analysis_language)
            .field("analysis_strict", &self.analysis_strict)
            .finish()
    }
}
