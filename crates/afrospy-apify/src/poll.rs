//! Run poller: waits for an actor run to reach a terminal status.
//!
//! The loop is an explicit state machine over [`PollState`]. Time comes from
//! `tokio::time`, so tests drive it with a paused clock, and status reads go
//! through [`RunStatusSource`], so tests can script them.

use std::time::Duration;

use afrospy_core::CancelFlag;
use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;

use crate::error::ApifyError;
use crate::types::{RunData, RunStatus};

/// Anything that can report the current state of a run.
#[async_trait]
pub trait RunStatusSource: Send + Sync {
    async fn run_status(&self, run_id: &str) -> Result<RunData, ApifyError>;
}

/// Fixed-interval polling with a wall-clock budget. No backoff, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(5 * 60),
        }
    }
}

impl PollPolicy {
    #[must_use]
    pub fn from_app_config(config: &afrospy_core::AppConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            timeout: config.poll_timeout(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    /// Local budget exhausted before the run reported a terminal status.
    /// Distinct from the remote `TIMED-OUT` status.
    #[error("run {run_id} did not finish within {}s", waited.as_secs())]
    Timeout { run_id: String, waited: Duration },

    #[error("run {run_id} ended with status {status}")]
    JobFailed { run_id: String, status: RunStatus },

    #[error("run {run_id} reported SUCCEEDED without a dataset id")]
    InconsistentSuccess { run_id: String },

    #[error("polling of run {run_id} was cancelled")]
    Cancelled { run_id: String },

    #[error(transparent)]
    Transport(#[from] ApifyError),
}

/// States of one poll loop. Everything except `Waiting` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Waiting { polls: u32 },
    Succeeded { dataset_id: String },
    Failed { status: RunStatus },
    InconsistentSuccess,
    TimedOut,
    Cancelled,
}

impl PollState {
    /// Transition taken after observing `run` on poll number `polls`.
    #[must_use]
    pub fn after_observing(run: &RunData, polls: u32) -> PollState {
        match &run.status {
            RunStatus::Succeeded => match run.default_dataset_id.as_deref() {
                Some(id) if !id.is_empty() => PollState::Succeeded {
                    dataset_id: id.to_owned(),
                },
                _ => PollState::InconsistentSuccess,
            },
            status if status.is_failure() => PollState::Failed {
                status: status.clone(),
            },
            _ => PollState::Waiting { polls },
        }
    }
}

/// Polls `run_id` until it succeeds, fails, is cancelled, or the policy's
/// budget runs out. Returns the run's dataset id.
///
/// Each iteration sleeps one interval first, then reads the status, so the
/// first read happens one interval after the call. `on_status` sees every
/// observed status.
///
/// # Errors
///
/// - [`PollError::JobFailed`] as soon as `FAILED`, `ABORTED` or `TIMED-OUT`
///   is observed.
/// - [`PollError::InconsistentSuccess`] if `SUCCEEDED` comes without a
///   dataset id.
/// - [`PollError::Timeout`] once `policy.timeout` has elapsed.
/// - [`PollError::Cancelled`] if `cancel` is set at a tick.
/// - [`PollError::Transport`] if a status read fails.
pub async fn wait_for_run<S, F>(
    source: &S,
    run_id: &str,
    policy: PollPolicy,
    cancel: &CancelFlag,
    mut on_status: F,
) -> Result<String, PollError>
where
    S: RunStatusSource + ?Sized,
    F: FnMut(&RunStatus) + Send,
{
    let started = Instant::now();
    let mut state = PollState::Waiting { polls: 0 };

    loop {
        state = match state {
            PollState::Waiting { polls } => {
                if cancel.is_cancelled() {
                    PollState::Cancelled
                } else if started.elapsed() >= policy.timeout {
                    PollState::TimedOut
                } else {
                    tokio::time::sleep(policy.interval).await;
                    if cancel.is_cancelled() {
                        PollState::Cancelled
                    } else {
                        let run = source.run_status(run_id).await?;
                        tracing::debug!(run_id, status = %run.status, polls = polls + 1, "Apify run status");
                        on_status(&run.status);
                        PollState::after_observing(&run, polls + 1)
                    }
                }
            }
            PollState::Succeeded { dataset_id } => return Ok(dataset_id),
            PollState::Failed { status } => {
                return Err(PollError::JobFailed {
                    run_id: run_id.to_owned(),
                    status,
                })
            }
            PollState::InconsistentSuccess => {
                return Err(PollError::InconsistentSuccess {
                    run_id: run_id.to_owned(),
                })
            }
            PollState::TimedOut => {
                return Err(PollError::Timeout {
                    run_id: run_id.to_owned(),
                    waited: started.elapsed(),
                })
            }
            PollState::Cancelled => {
                return Err(PollError::Cancelled {
                    run_id: run_id.to_owned(),
                })
            }
        };
    }
}
