//! Job state and progress broadcasting.
//!
//! The job store is the single registry of jobs for the process; every
//! change it records is also published on the progress broadcaster.

pub mod job_progress;
pub mod job_store;

pub use job_progress::{JobProgressBroadcaster, JobProgressEvent, JobProgressKind, JobStatus};
pub use job_store::{JobHandle, JobRecord, JobStore, JobView};
