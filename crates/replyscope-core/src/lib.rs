//! Shared types and configuration for replyscope.
//!
//! Holds the canonical comment record produced by the scrape pipeline, the
//! typed analysis document produced by the analysis pipeline, and the
//! process-wide [`AppConfig`] loaded once at startup.

pub mod analysis;
pub mod app_config;
pub mod comments;
pub mod config;

use thiserror::Error;

pub use analysis::{
    AnalysisResult, Emotion, ImpactLabel, InfluentialUser, InvariantViolation, SentimentBreakdown,
    SentimentLabel, TimelineEntry, Topic,
};
pub use app_config::AppConfig;
pub use comments::{loose_comments, parse_timestamp, CanonicalComment, ScrapeEnvelope};
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
