use thiserror::Error;

use crate::poll::JobStatus;

/// Errors returned while driving a remote scrape job.
#[derive(Debug, Error)]
pub enum JobError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The runner rejected the submission or returned no run id.
    #[error("job submission failed: {0}")]
    Submission(String),

    /// The runner answered a status or dataset request with a non-2xx status.
    #[error("job runner error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The job reached a terminal state other than success, or the poll
    /// budget ran out.
    #[error("scrape job finished with status {status}")]
    JobFailed { status: JobStatus },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
