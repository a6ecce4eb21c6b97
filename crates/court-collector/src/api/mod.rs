//! Transport-agnostic request handlers.
//!
//! Each handler maps to one HTTP route; an HTTP layer only has to decode the
//! request, call the handler and encode the response with
//! [`ApiError::status_code`] on failure.
//!
//! | Route                     | Handler                   |
//! |---------------------------|---------------------------|
//! | `POST /start`             | [`JobService::start`]     |
//! | `GET /jobs`               | [`JobService::list`]      |
//! | `GET /status/{job_id}`    | [`JobService::status`]    |
//! | `GET /download/{job_id}`  | [`JobService::download`]  |
//! | `POST /config/test`       | [`JobService::test_config`] |

pub mod service;

pub use service::JobService;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::broadcast::JobStatus;
use crate::error::{ConfigError, JobError};

/// Media type of the CSV artifact.
pub const CSV_MEDIA_TYPE: &str = "text/csv";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("job not found")]
    JobNotFound(String),

    #[error("file not ready")]
    FileNotReady(String),

    #[error("{0}")]
    Validation(ConfigError),

    #[error("{0}")]
    BadDocument(ConfigError),

    #[error("Failed to read artifact '{path}': {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Job(JobError),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::JobNotFound(_) | ApiError::FileNotReady(_) => 404,
            ApiError::Validation(_) => 422,
            ApiError::BadDocument(_) => 400,
            ApiError::Artifact { .. } | ApiError::Job(_) => 500,
        }
    }
}

impl From<JobError> for ApiError {
    fn from(e: JobError) -> Self {
        match e {
            JobError::NotFound(id) => ApiError::JobNotFound(id),
            other => ApiError::Job(other),
        }
    }
}

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl From<&ApiError> for ErrorBody {
    fn from(e: &ApiError) -> Self {
        Self {
            detail: e.to_string(),
        }
    }
}

/// Response of `POST /start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartResponse {
    pub job_id: String,
    pub status: JobStatus,
}

/// One entry of `GET /jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub job_id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

/// Response of a cancellation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelResponse {
    pub job_id: String,
    /// False if the job had already finished.
    pub cancelled: bool,
}

/// Response of `POST /config/test`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigTestResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConfigTestResponse {
    pub fn ok(parsed: serde_json::Value) -> Self {
        Self {
            ok: true,
            parsed: Some(parsed),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            parsed: None,
            error: Some(message.into()),
        }
    }

    pub fn status_code(&self) -> u16 {
        if self.ok {
            200
        } else {
            400
        }
    }
}

/// CSV artifact ready to be sent as a file download.
#[derive(Debug, Clone)]
pub struct CsvDownload {
    pub file_name: String,
    pub media_type: &'static str,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Download file name for a job's CSV artifact.
pub fn download_file_name(job_id: &str) -> String {
    format!("cases_{}.csv", job_id)
}
