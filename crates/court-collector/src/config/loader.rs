use std::path::Path;

use crate::config::schema::{CollectConfig, ServiceConfig};
use crate::error::ConfigError;

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn load_collect_config<P: AsRef<Path>>(path: P) -> Result<CollectConfig, ConfigError> {
    let content = read_file(path.as_ref())?;
    parse_collect_config(&content)
}

/// Parses a job config from YAML or JSON (JSON is valid YAML).
///
/// Only the document shape is checked here; limits that depend on the
/// service are applied by [`validate_collect_config`].
pub fn parse_collect_config(content: &str) -> Result<CollectConfig, ConfigError> {
    let config: CollectConfig = serde_yaml::from_str(content)?;
    Ok(config)
}

pub fn load_service_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, ConfigError> {
    let content = read_file(path.as_ref())?;
    let config: ServiceConfig = serde_yaml::from_str(&content)?;

    if config.max_concurrent_jobs == 0 {
        return Err(ConfigError::validation(
            "max_concurrent_jobs must be at least 1",
        ));
    }

    Ok(config)
}

pub fn validate_collect_config(
    config: &CollectConfig,
    service: &ServiceConfig,
) -> Result<(), ConfigError> {
    if config.queries.is_empty() {
        return Err(ConfigError::validation("queries must not be empty"));
    }

    if let Some(pos) = config.queries.iter().position(|q| q.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "query #{} is blank",
            pos + 1
        )));
    }

    if config.queries.len() > service.max_queries_per_job {
        return Err(ConfigError::validation(format!(
            "too many queries: {} (limit {})",
            config.queries.len(),
            service.max_queries_per_job
        )));
    }

    if config.max_links_per_query == 0 {
        return Err(ConfigError::validation(
            "max_links_per_query must be at least 1",
        ));
    }

    Ok(())
}

/// Parses an arbitrary uploaded config document into a JSON value.
///
/// Backs the config test utility; the document does not have to be a
/// valid job config.
pub fn parse_config_document(bytes: &[u8]) -> Result<serde_json::Value, ConfigError> {
    let value: serde_yaml::Value = serde_yaml::from_slice(bytes)?;
    Ok(serde_json::to_value(value)?)
}
