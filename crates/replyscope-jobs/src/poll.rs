//! Explicit state machine for a remote scrape job and the bounded poll loop
//! that drives it.
//!
//! The loop never sleeps on its own: waiting goes through a [`Sleeper`], so
//! the server uses [`TokioSleeper`] while tests substitute a recorder that
//! returns immediately.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::error::JobError;

/// Lifecycle of a remote job as seen by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    /// The local poll budget ran out before the runner reported a terminal
    /// status. Never reported by the runner itself.
    TimedOut,
}

impl JobStatus {
    /// Maps a job-runner status string onto the local lifecycle.
    ///
    /// Transitional runner states (`TIMING-OUT`, `ABORTING`) and unknown
    /// values count as [`JobStatus::Running`]; the poll budget still bounds
    /// how long they are waited on.
    #[must_use]
    pub fn from_runner(raw: &str) -> Self {
        match raw {
            "READY" => Self::Queued,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" | "ABORTED" | "TIMED-OUT" => Self::Failed,
            _ => Self::Running,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }

    /// Next state after observing `observed` from the runner. Terminal
    /// states are absorbing.
    #[must_use]
    pub fn transition(self, observed: JobStatus) -> JobStatus {
        if self.is_terminal() {
            self
        } else {
            observed
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::TimedOut => write!(f, "timed out"),
        }
    }
}

/// A submitted job and what the poll loop has learned about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteJob {
    pub id: String,
    status: JobStatus,
    attempts_polled: u32,
}

impl RemoteJob {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            attempts_polled: 0,
        }
    }

    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status
    }

    #[must_use]
    pub fn attempts_polled(&self) -> u32 {
        self.attempts_polled
    }

    fn record_poll(&mut self, observed: JobStatus) {
        self.attempts_polled += 1;
        self.status = self.status.transition(observed);
    }

    fn expire(&mut self) {
        self.status = self.status.transition(JobStatus::TimedOut);
    }
}

/// Interval and attempt budget for [`poll_until_terminal`].
///
/// The total wait is bounded by `interval * max_attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 20,
        }
    }
}

impl PollPolicy {
    #[must_use]
    pub fn from_app_config(config: &replyscope_core::AppConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.poll_max_attempts,
        }
    }
}

/// Suspends the current task between polls.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Polls `fetch_status` until the job is terminal or the budget runs out.
///
/// Each tick sleeps `policy.interval` first, then fetches. Returns the job
/// once it has [`JobStatus::Succeeded`].
///
/// # Errors
///
/// - [`JobError::JobFailed`] with [`JobStatus::Failed`] when the runner
///   reports failure, or [`JobStatus::TimedOut`] after `max_attempts` polls
///   without a terminal status.
/// - Any error returned by `fetch_status` is propagated as-is; a failed
///   status request is not retried.
pub async fn poll_until_terminal<S, F, Fut>(
    job_id: &str,
    policy: PollPolicy,
    sleeper: &S,
    mut fetch_status: F,
) -> Result<RemoteJob, JobError>
where
    S: Sleeper,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<JobStatus, JobError>>,
{
    let mut job = RemoteJob::new(job_id);

    while !job.status.is_terminal() {
        if job.attempts_polled >= policy.max_attempts {
            job.expire();
            break;
        }

        sleeper.sleep(policy.interval).await;
        let observed = fetch_status().await?;
        job.record_poll(observed);

        tracing::debug!(
            run_id = %job.id,
            status = %job.status,
            attempt = job.attempts_polled,
            max_attempts = policy.max_attempts,
            "polled scrape job"
        );
    }

    match job.status {
        JobStatus::Succeeded => Ok(job),
        status => {
            tracing::warn!(
                run_id = %job.id,
                %status,
                attempts = job.attempts_polled,
                "scrape job did not succeed"
            );
            Err(JobError::JobFailed { status })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Records requested sleeps and returns immediately.
    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
            self.slept.lock().unwrap().push(duration);
            std::future::ready(())
        }
    }

    fn policy(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(2),
            max_attempts,
        }
    }

    #[test]
    fn runner_status_mapping() {
        assert_eq!(JobStatus::from_runner("READY"), JobStatus::Queued);
        assert_eq!(JobStatus::from_runner("RUNNING"), JobStatus::Running);
        assert_eq!(JobStatus::from_runner("TIMING-OUT"), JobStatus::Running);
        assert_eq!(JobStatus::from_runner("SUCCEEDED"), JobStatus::Succeeded);
        assert_eq!(JobStatus::from_runner("ABORTED"), JobStatus::Failed);
        assert_eq!(JobStatus::from_runner("TIMED-OUT"), JobStatus::Failed);
        assert_eq!(JobStatus::from_runner("SOMETHING-NEW"), JobStatus::Running);
    }

    #[test]
    fn terminal_states_are_absorbing() {
        assert_eq!(
            JobStatus::Succeeded.transition(JobStatus::Running),
            JobStatus::Succeeded
        );
        assert_eq!(
            JobStatus::Failed.transition(JobStatus::Succeeded),
            JobStatus::Failed
        );
        assert_eq!(
            JobStatus::Queued.transition(JobStatus::Running),
            JobStatus::Running
        );
    }

    #[tokio::test]
    async fn always_running_times_out_after_budget() {
        let sleeper = RecordingSleeper::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = poll_until_terminal("run-1", policy(20), &sleeper, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(JobStatus::Running)
            }
        })
        .await;

        assert!(
            matches!(
                result,
                Err(JobError::JobFailed {
                    status: JobStatus::TimedOut
                })
            ),
            "expected TimedOut, got: {result:?}"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 20);
        let slept = sleeper.slept.lock().unwrap();
        assert_eq!(slept.len(), 20);
        assert!(slept.iter().all(|d| *d == Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn queued_then_running_then_succeeded() {
        let sleeper = RecordingSleeper::default();
        let script = Arc::new(Mutex::new(VecDeque::from([
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Succeeded,
        ])));

        let job = poll_until_terminal("run-2", policy(20), &sleeper, || {
            let script = Arc::clone(&script);
            async move { Ok(script.lock().unwrap().pop_front().unwrap()) }
        })
        .await
        .expect("job should succeed");

        assert_eq!(job.status(), JobStatus::Succeeded);
        assert_eq!(job.attempts_polled(), 3);
        assert_eq!(sleeper.slept.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn success_on_last_allowed_attempt_is_not_a_timeout() {
        let sleeper = RecordingSleeper::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let job = poll_until_terminal("run-3", policy(3), &sleeper, || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(if n == 3 {
                    JobStatus::Succeeded
                } else {
                    JobStatus::Running
                })
            }
        })
        .await
        .expect("job should succeed");

        assert_eq!(job.attempts_polled(), 3);
    }

    #[tokio::test]
    async fn failed_status_stops_immediately() {
        let sleeper = RecordingSleeper::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = poll_until_terminal("run-4", policy(20), &sleeper, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(JobStatus::Failed)
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(JobError::JobFailed {
                status: JobStatus::Failed
            })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn status_fetch_error_is_not_retried() {
        let sleeper = RecordingSleeper::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = poll_until_terminal("run-5", policy(20), &sleeper, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<JobStatus, _>(JobError::Upstream {
                    status: 502,
                    message: "bad gateway".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(JobError::Upstream { status: 502, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_policy_bounds_wait_to_forty_seconds() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval * policy.max_attempts, Duration::from_secs(40));
    }
}
