//! Isolated job service over a scripted site.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use court_collector::{JobService, ServiceConfig};

use super::driver::Site;

pub struct TestHarness {
    temp_dir: TempDir,
    pub site: Site,
    pub service: JobService,
}

impl TestHarness {
    pub fn new(site: Site) -> Self {
        Self::with_settings(site, |_| {})
    }

    /// Builds a harness whose data directory lives in a fresh temp dir.
    pub fn with_settings(site: Site, customize: impl FnOnce(&mut ServiceConfig)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut settings = ServiceConfig {
            data_dir: temp_dir.path().join("data"),
            ..ServiceConfig::default()
        };
        customize(&mut settings);

        let service = JobService::new(site.launcher(), settings);
        Self {
            temp_dir,
            site,
            service,
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.service.settings().data_dir.clone()
    }
}
