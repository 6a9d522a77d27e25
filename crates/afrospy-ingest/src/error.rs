use std::time::Duration;

use afrospy_apify::{ApifyError, PollError, RunStatus};
use thiserror::Error;

/// Terminal failures of an ingestion run. Per-record store failures are not
/// here: they are counted in the summary instead.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The actor refused to start, or the launch request failed.
    #[error(transparent)]
    Launch(ApifyError),

    #[error("run {run_id} still unfinished after {}s", waited.as_secs())]
    PollTimeout { run_id: String, waited: Duration },

    #[error("run {run_id} ended with status {status}")]
    JobFailed { run_id: String, status: RunStatus },

    #[error("run {run_id} reported SUCCEEDED without a dataset id")]
    InconsistentSuccess { run_id: String },

    #[error("status check for run {run_id} failed: {source}")]
    Status {
        run_id: String,
        #[source]
        source: ApifyError,
    },

    #[error("dataset {dataset_id} fetch failed: {source}")]
    Fetch {
        dataset_id: String,
        #[source]
        source: ApifyError,
    },

    #[error("run {run_id} cancelled")]
    Cancelled { run_id: String },

    /// A dataset import, which has no run, was cancelled.
    #[error("import of dataset {dataset_id} cancelled")]
    ImportCancelled { dataset_id: String },
}

impl IngestError {
    pub(crate) fn from_poll(run_id: &str, err: PollError) -> Self {
        match err {
            PollError::Timeout { run_id, waited } => IngestError::PollTimeout { run_id, waited },
            PollError::JobFailed { run_id, status } => IngestError::JobFailed { run_id, status },
            PollError::InconsistentSuccess { run_id } => {
                IngestError::InconsistentSuccess { run_id }
            }
            PollError::Cancelled { run_id } => IngestError::Cancelled { run_id },
            PollError::Transport(source) => IngestError::Status {
                run_id: run_id.to_owned(),
                source,
            },
        }
    }
}
