use thiserror::Error;

use crate::error::{DriverError, ExportError, JobError};

/// Errors that end a job in `failed`.
///
/// Per-query and per-URL failures never surface here; the runner records
/// them in the job log and moves on.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to start page-automation session: {0}")]
    Launch(#[source] DriverError),

    #[error("CSV export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Job state error: {0}")]
    Job(#[from] JobError),

    #[error("cancelled")]
    Cancelled,
}
