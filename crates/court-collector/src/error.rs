use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiError;
use crate::broadcast::JobStatus;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Config document is not representable as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

impl ConfigError {
    pub fn validation(message: impl Into<String>) -> Self {
        ConfigError::Validation {
            message: message.into(),
        }
    }
}

/// Failures reported by a page-automation session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Failed to launch browser session: {0}")]
    Launch(String),

    #[error("Navigation to '{url}' failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element '{selector}' not found")]
    ElementNotFound { selector: String },

    #[error("Timed out waiting for page to settle")]
    Timeout,

    #[error("Browser error: {0}")]
    Browser(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode CSV row: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition for job {job_id}: {from} -> {to}")]
    InvalidTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },
}

pub type Result<T> = std::result::Result<T, CollectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_errors_convert_with_context() {
        let err: CollectorError = ConfigError::validation("queries must not be empty").into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Config validation failed: queries must not be empty"
        );

        let err: CollectorError = ApiError::JobNotFound("abc".to_string()).into();
        assert_eq!(err.to_string(), "job not found");
    }

    #[test]
    fn test_question_mark_lifts_into_result() {
        fn read(path: &str) -> Result<Vec<u8>> {
            let bytes = std::fs::read(path).map_err(|source| ConfigError::ReadFile {
                path: PathBuf::from(path),
                source,
            })?;
            Ok(bytes)
        }

        let err = read("/nonexistent/collect.yaml").unwrap_err();
        assert!(matches!(err, CollectorError::Config(ConfigError::ReadFile { .. })));
    }
}
