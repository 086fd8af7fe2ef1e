use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Credentials are optional here: a missing token only fails the request that
/// needs it, so the server can still answer the other endpoint.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => parse_flag(&raw).ok_or_else(|| invalid(var, format!("not a boolean: {raw}"))),
        }
    };

    let bind_addr = parse_addr("REPLYSCOPE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("REPLYSCOPE_LOG_LEVEL", "info");
    let http_timeout_secs = parse_u64("REPLYSCOPE_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("REPLYSCOPE_USER_AGENT", "replyscope/0.1 (reply-analysis)");

    let apify_api_token = optional("APIFY_API_TOKEN");
    let apify_base_url = or_default("APIFY_BASE_URL", "https://api.apify.com/v2");
    let apify_actor_id = or_default("APIFY_ACTOR_ID", "apidojo~tweet-scraper");
    let scrape_max_items = parse_u32("REPLYSCOPE_SCRAPE_MAX_ITEMS", "100")?;
    let scrape_result_limit = parse_u32("REPLYSCOPE_SCRAPE_RESULT_LIMIT", "100")?;
    let poll_interval_ms = parse_u64("REPLYSCOPE_POLL_INTERVAL_MS", "2000")?;
    let poll_max_attempts = parse_u32("REPLYSCOPE_POLL_MAX_ATTEMPTS", "20")?;

    let anthropic_api_key = optional("ANTHROPIC_API_KEY");
    let anthropic_base_url = or_default("ANTHROPIC_BASE_URL", "https://api.anthropic.com");
    let anthropic_model = or_default("ANTHROPIC_MODEL", "claude-haiku-4-5-20251001");
    let anthropic_max_tokens = parse_u32("ANTHROPIC_MAX_TOKENS", "2000")?;
    let analysis_language = or_default("REPLYSCOPE_ANALYSIS_LANGUAGE", "español");
    let analysis_strict = parse_bool("REPLYSCOPE_ANALYSIS_STRICT", true)?;

    if poll_max_attempts == 0 {
        return Err(invalid(
            "REPLYSCOPE_POLL_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        bind_addr,
        log_level,
        http_timeout_secs,
        user_agent,
        apify_api_token,
        apify_base_url,
        apify_actor_id,
        scrape_max_items,
        scrape_result_limit,
        poll_interval_ms,
        poll_max_attempts,
        anthropic_api_key,
        anthropic_base_url,
        anthropic_model,
        anthropic_max_tokens,
        analysis_language,
        analysis_strict,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
