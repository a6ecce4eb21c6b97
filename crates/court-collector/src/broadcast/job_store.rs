//! In-process job registry.
//!
//! Each job entry is written only by the task that runs it (through a
//! [`JobHandle`]) and read by status/download callers. Fields are locked
//! individually, so a reader never sees a half-written status, link list or
//! log, without serializing the whole job.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::broadcast::job_progress::{JobProgressBroadcaster, JobProgressEvent, JobStatus};
use crate::error::JobError;

// ─── Helpers ────────────────────────────────────────────────────────────────

fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Job store {} lock was poisoned, recovering", what);
            poisoned.into_inner()
        }
    }
}

fn write<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Job store {} lock was poisoned, recovering", what);
            poisoned.into_inner()
        }
    }
}

/// Generates an opaque job identifier (32 lowercase hex characters).
pub fn new_job_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// ─── JobRecord ──────────────────────────────────────────────────────────────

/// State of one job.
pub struct JobRecord {
    id: String,
    /// Submission order within the store.
    seq: u64,
    created_at: DateTime<Utc>,
    status: RwLock<JobStatus>,
    links: RwLock<Vec<String>>,
    log: RwLock<Vec<String>>,
    csv_path: RwLock<Option<PathBuf>>,
    cancel_requested: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl JobRecord {
    fn new(id: String, seq: u64) -> Self {
        Self {
            id,
            seq,
            created_at: Utc::now(),
            status: RwLock::new(JobStatus::Queued),
            links: RwLock::new(Vec::new()),
            log: RwLock::new(Vec::new()),
            csv_path: RwLock::new(None),
            cancel_requested: watch::Sender::new(false),
            task: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> JobStatus {
        *read(&self.status, "status")
    }

    pub fn links(&self) -> Vec<String> {
        read(&self.links, "links").clone()
    }

    pub fn log_lines(&self) -> Vec<String> {
        read(&self.log, "log").clone()
    }

    pub fn csv_path(&self) -> Option<PathBuf> {
        read(&self.csv_path, "csv").clone()
    }

    pub fn is_cancel_requested(&self) -> bool {
        *self.cancel_requested.borrow()
    }

    /// Snapshot for the status endpoint.
    pub fn view(&self) -> JobView {
        JobView {
            job_id: self.id.clone(),
            status: self.status(),
            links: self.links(),
            csv: self.csv_path().map(|p| p.display().to_string()),
            log: self.log_lines(),
        }
    }
}

/// Serializable job snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobView {
    pub job_id: String,
    pub status: JobStatus,
    pub links: Vec<String>,
    pub csv: Option<String>,
    pub log: Vec<String>,
}

// ─── JobHandle ──────────────────────────────────────────────────────────────

/// Write access to a single job, held by the task that runs it.
#[derive(Clone)]
pub struct JobHandle {
    record: Arc<JobRecord>,
    broadcaster: JobProgressBroadcaster,
}

impl JobHandle {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn status(&self) -> JobStatus {
        self.record.status()
    }

    /// Moves the job to `next`, rejecting regressions and skips.
    pub fn advance(&self, next: JobStatus) -> Result<(), JobError> {
        {
            let mut status = write(&self.record.status, "status");
            if !status.can_advance_to(next) {
                return Err(JobError::InvalidTransition {
                    job_id: self.record.id.clone(),
                    from: *status,
                    to: next,
                });
            }
            *status = next;
        }

        self.broadcaster
            .send(JobProgressEvent::status(&self.record.id, next));
        Ok(())
    }

    /// Appends a line to the job log.
    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        write(&self.record.log, "log").push(line.clone());
        self.broadcaster
            .send(JobProgressEvent::log(&self.record.id, self.status(), &line));
    }

    pub fn set_links(&self, links: Vec<String>) {
        *write(&self.record.links, "links") = links;
    }

    pub fn set_csv_path(&self, path: PathBuf) {
        *write(&self.record.csv_path, "csv") = Some(path);
    }

    pub fn is_cancelled(&self) -> bool {
        self.record.is_cancel_requested()
    }

    /// Resolves once cancellation has been requested for this job.
    pub async fn cancelled(&self) {
        let mut rx = self.record.cancel_requested.subscribe();
        // The sender lives in the record this handle keeps alive.
        let _ = rx.wait_for(|requested| *requested).await;
    }
}

// ─── JobStore ───────────────────────────────────────────────────────────────

/// Registry mapping job id to job state. Entries live as long as the process.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<String, Arc<JobRecord>>>,
    next_seq: AtomicU64,
    broadcaster: JobProgressBroadcaster,
}

impl JobStore {
    pub fn new(broadcaster: JobProgressBroadcaster) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            broadcaster,
        }
    }

    pub fn broadcaster(&self) -> &JobProgressBroadcaster {
        &self.broadcaster
    }

    /// Registers a new `queued` job and returns its writer handle.
    pub fn create(&self) -> JobHandle {
        let id = new_job_id();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let record = Arc::new(JobRecord::new(id.clone(), seq));
        write(&self.jobs, "registry").insert(id.clone(), Arc::clone(&record));

        self.broadcaster
            .send(JobProgressEvent::status(&id, JobStatus::Queued));

        JobHandle {
            record,
            broadcaster: self.broadcaster.clone(),
        }
    }

    pub fn record(&self, job_id: &str) -> Option<Arc<JobRecord>> {
        read(&self.jobs, "registry").get(job_id).cloned()
    }

    /// Returns a job snapshot by ID.
    pub fn get(&self, job_id: &str) -> Option<JobView> {
        self.record(job_id).map(|r| r.view())
    }

    /// Returns every job record in submission order.
    pub fn records(&self) -> Vec<Arc<JobRecord>> {
        let mut records: Vec<Arc<JobRecord>> =
            read(&self.jobs, "registry").values().cloned().collect();
        records.sort_by_key(|r| r.seq);
        records
    }

    pub fn len(&self) -> usize {
        read(&self.jobs, "registry").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores the task running `job_id` alongside its record.
    pub fn attach_task(&self, job_id: &str, task: JoinHandle<()>) -> Result<(), JobError> {
        let record = self
            .record(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        let mut slot = match record.task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(task);
        Ok(())
    }

    /// Takes the task handle of `job_id`, if one is attached.
    pub fn take_task(&self, job_id: &str) -> Option<JoinHandle<()>> {
        let record = self.record(job_id)?;
        let mut slot = match record.task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.take()
    }

    /// Signals the job's task to stop at its next suspension point.
    ///
    /// Returns false if the job already finished.
    pub fn request_cancel(&self, job_id: &str) -> Result<bool, JobError> {
        let record = self
            .record(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        if record.status().is_terminal() {
            return Ok(false);
        }
        record.cancel_requested.send_replace(true);
        Ok(true)
    }
}
