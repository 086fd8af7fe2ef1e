//! Remote scrape job orchestration and record normalization.

pub mod client;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod poll;
pub mod types;

pub use client::RemoteJobClient;
pub use error::JobError;
pub use normalize::{normalize_record, normalize_records};
pub use pipeline::{scrape_thread, ScrapeSettings};
pub use poll::{poll_until_terminal, JobStatus, PollPolicy, RemoteJob, Sleeper, TokioSleeper};
