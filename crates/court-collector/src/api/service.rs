use std::sync::Arc;

use tokio::sync::{broadcast, Semaphore};
use tracing::{info, warn};

use crate::broadcast::{JobProgressEvent, JobStatus, JobStore, JobView};
use crate::config::{
    parse_collect_config, parse_config_document, validate_collect_config, CollectConfig,
    ServiceConfig,
};
use crate::driver::DriverLauncher;
use crate::pipeline::JobRunner;

use super::{
    download_file_name, ApiError, CancelResponse, ConfigTestResponse, CsvDownload, JobSummary,
    StartResponse, CSV_MEDIA_TYPE,
};

/// Job submission and query surface shared by every transport.
pub struct JobService {
    store: Arc<JobStore>,
    runner: Arc<JobRunner>,
    settings: Arc<ServiceConfig>,
    permits: Arc<Semaphore>,
}

impl JobService {
    pub fn new(launcher: Arc<dyn DriverLauncher>, settings: ServiceConfig) -> Self {
        let settings = Arc::new(settings);
        let runner = JobRunner::new(launcher, Arc::clone(&settings));
        Self::with_runner(runner, settings, Arc::new(JobStore::default()))
    }

    pub fn with_runner(runner: JobRunner, settings: Arc<ServiceConfig>, store: Arc<JobStore>) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_concurrent_jobs.max(1)));
        Self {
            store,
            runner: Arc::new(runner),
            settings,
            permits,
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn settings(&self) -> &ServiceConfig {
        &self.settings
    }

    /// Streams status changes and log lines of every job.
    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.store.broadcaster().subscribe()
    }

    /// Registers a job and schedules it in the background. Returns at once.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, config: CollectConfig) -> Result<StartResponse, ApiError> {
        validate_collect_config(&config, &self.settings).map_err(ApiError::Validation)?;

        let job = self.store.create();
        let job_id = job.id().to_string();
        info!(job_id = %job_id, queries = config.queries.len(), "Job submitted");

        let runner = Arc::clone(&self.runner);
        let permits = Arc::clone(&self.permits);
        let task = tokio::spawn(async move {
            let permit = tokio::select! {
                permit = permits.acquire_owned() => permit.ok(),
                // The runner sees the request and fails the job without
                // touching the driver.
                _ = job.cancelled() => None,
            };
            runner.run(job, config).await;
            drop(permit);
        });
        self.store.attach_task(&job_id, task)?;

        Ok(StartResponse {
            job_id,
            status: JobStatus::Queued,
        })
    }

    /// Parses a request body (JSON or YAML) and submits it.
    pub fn start_from_document(&self, body: &str) -> Result<StartResponse, ApiError> {
        let config = parse_collect_config(body).map_err(ApiError::Validation)?;
        self.start(config)
    }

    pub fn status(&self, job_id: &str) -> Result<JobView, ApiError> {
        self.store
            .get(job_id)
            .ok_or_else(|| ApiError::JobNotFound(job_id.to_string()))
    }

    /// Lists every known job, oldest submission first.
    pub fn list(&self) -> Vec<JobSummary> {
        self.store
            .records()
            .iter()
            .map(|record| JobSummary {
                job_id: record.id().to_string(),
                status: record.status(),
                created_at: record.created_at(),
            })
            .collect()
    }

    /// Returns the CSV artifact once the job has produced it.
    pub async fn download(&self, job_id: &str) -> Result<CsvDownload, ApiError> {
        let record = self
            .store
            .record(job_id)
            .ok_or_else(|| ApiError::JobNotFound(job_id.to_string()))?;
        let path = record
            .csv_path()
            .ok_or_else(|| ApiError::FileNotReady(job_id.to_string()))?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(job_id, path = %path.display(), "CSV artifact missing on disk");
                return Err(ApiError::FileNotReady(job_id.to_string()));
            }
            Err(source) => return Err(ApiError::Artifact { path, source }),
        };

        Ok(CsvDownload {
            file_name: download_file_name(job_id),
            media_type: CSV_MEDIA_TYPE,
            path,
            bytes,
        })
    }

    /// Parses an uploaded config document without submitting anything.
    pub fn test_config(bytes: &[u8]) -> ConfigTestResponse {
        match parse_config_document(bytes) {
            Ok(parsed) => ConfigTestResponse::ok(parsed),
            Err(e) => ConfigTestResponse::err(ApiError::BadDocument(e).to_string()),
        }
    }

    /// Requests cancellation; the job stops at its next suspension point.
    pub fn cancel(&self, job_id: &str) -> Result<CancelResponse, ApiError> {
        let cancelled = self.store.request_cancel(job_id)?;
        if cancelled {
            info!(job_id, "Cancellation requested");
        }
        Ok(CancelResponse {
            job_id: job_id.to_string(),
            cancelled,
        })
    }

    /// Waits until the job reaches a terminal state and returns its final view.
    pub async fn wait(&self, job_id: &str) -> Result<JobView, ApiError> {
        let record = self
            .store
            .record(job_id)
            .ok_or_else(|| ApiError::JobNotFound(job_id.to_string()))?;

        if let Some(task) = self.store.take_task(job_id) {
            if let Err(e) = task.await {
                warn!(job_id, error = %e, "Job task ended abnormally");
            }
        } else {
            // Another caller owns the task handle; follow the broadcast instead.
            let mut events = self.subscribe();
            while !record.status().is_terminal() {
                match events.recv().await {
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }

        Ok(record.view())
    }
}
