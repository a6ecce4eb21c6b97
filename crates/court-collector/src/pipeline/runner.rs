use std::collections::BTreeSet;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::broadcast::{JobHandle, JobStatus};
use crate::config::{CollectConfig, ServiceConfig};
use crate::dedupe::dedupe;
use crate::driver::{DriverLauncher, PageDriver};
use crate::error::DriverError;
use crate::export::export_csv;
use crate::extract::FieldExtractor;
use crate::harvest::{harvest, HarvestRequest, PortalStrategy, PORTALS};
use crate::record::CaseRecord;

use super::error::PipelineError;

/// Drives one job from `queued` to `done` or `failed`.
///
/// Harvesting and extraction each run in their own driver session; the
/// harvest session is closed before the extraction session is launched.
pub struct JobRunner {
    launcher: Arc<dyn DriverLauncher>,
    settings: Arc<ServiceConfig>,
    extractor: FieldExtractor,
    portals: Vec<PortalStrategy>,
}

impl JobRunner {
    pub fn new(launcher: Arc<dyn DriverLauncher>, settings: Arc<ServiceConfig>) -> Self {
        Self {
            launcher,
            settings,
            extractor: FieldExtractor::default(),
            portals: PORTALS.to_vec(),
        }
    }

    /// Location of the CSV artifact for `job_id`.
    pub fn csv_path(&self, job_id: &str) -> PathBuf {
        self.settings.data_dir.join(format!("{}.csv", job_id))
    }

    /// Runs the job to a terminal state. Never returns an error; failures are
    /// recorded on the job.
    pub async fn run(&self, job: JobHandle, config: CollectConfig) {
        let span = info_span!("job", job_id = %job.id());

        async {
            match self.execute(&job, &config).await {
                Ok(count) => info!(records = count, "Job finished"),
                Err(PipelineError::Cancelled) => {
                    warn!("Job cancelled");
                    job.log("cancelled");
                    mark_failed(&job);
                }
                Err(e) => {
                    error!(error = %e, "Job failed");
                    job.log(format!("job failed: {}", e));
                    mark_failed(&job);
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, job: &JobHandle, config: &CollectConfig) -> Result<usize, PipelineError> {
        checkpoint(job)?;
        job.advance(JobStatus::CollectingLinks)?;
        info!(queries = config.queries.len(), "Collecting links");

        let links = self.collect_links(job, config).await?;
        job.set_links(links.clone());

        checkpoint(job)?;
        job.advance(JobStatus::Extracting)?;
        info!(links = links.len(), "Extracting records");

        let records = self.extract_records(job, &links, config).await?;
        let records = dedupe(records);

        checkpoint(job)?;
        let path = self.csv_path(job.id());
        export_csv(&records, &path)?;
        job.set_csv_path(path);

        job.log(format!("done: {} records", records.len()));
        job.advance(JobStatus::Done)?;
        Ok(records.len())
    }

    // ─── Harvest phase ──────────────────────────────────────────────────────

    async fn collect_links(
        &self,
        job: &JobHandle,
        config: &CollectConfig,
    ) -> Result<Vec<String>, PipelineError> {
        let driver = self.launcher.launch().await.map_err(PipelineError::Launch)?;
        let result = self.harvest_queries(driver.as_ref(), job, config).await;
        close_session(driver.as_ref()).await;
        result
    }

    async fn harvest_queries(
        &self,
        driver: &dyn PageDriver,
        job: &JobHandle,
        config: &CollectConfig,
    ) -> Result<Vec<String>, PipelineError> {
        let pause = Duration::from_secs(config.pause_sec);
        let mut all_links = BTreeSet::new();

        for query in &config.queries {
            let request = HarvestRequest {
                query,
                year_from: config.year_from,
                instances: &config.instances,
                max_links: config.max_links_per_query,
                pause,
            };

            for portal in &self.portals {
                checkpoint(job)?;
                match until_cancelled(job, harvest(driver, portal, &request)).await? {
                    Ok(links) => {
                        job.log(format!("{}: '{}' -> {} links", portal.name, query, links.len()));
                        all_links.extend(links);
                    }
                    Err(e) => {
                        warn!(portal = portal.name, query = %query, error = %e, "Link harvest failed");
                        job.log(format!("link harvest failed for '{}': {}", query, e));
                        break;
                    }
                }
            }

            pacing(job, pause).await?;
        }

        // BTreeSet iteration gives the sorted order extraction relies on.
        Ok(all_links.into_iter().collect())
    }

    // ─── Extraction phase ───────────────────────────────────────────────────

    async fn extract_records(
        &self,
        job: &JobHandle,
        links: &[String],
        config: &CollectConfig,
    ) -> Result<Vec<CaseRecord>, PipelineError> {
        let driver = self.launcher.launch().await.map_err(PipelineError::Launch)?;
        let result = self.read_pages(driver.as_ref(), job, links, config).await;
        close_session(driver.as_ref()).await;
        result
    }

    async fn read_pages(
        &self,
        driver: &dyn PageDriver,
        job: &JobHandle,
        links: &[String],
        config: &CollectConfig,
    ) -> Result<Vec<CaseRecord>, PipelineError> {
        let pause = Duration::from_secs(config.pause_sec);
        let fetch_delay = Duration::from_millis(self.settings.fetch_delay_ms);
        let mut records = Vec::with_capacity(links.len());

        for url in links {
            checkpoint(job)?;
            match until_cancelled(job, fetch_text(driver, url, pause)).await? {
                Ok(text) => {
                    debug!(url = %url, chars = text.len(), "Page read");
                    records.push(self.extractor.extract(url, &text));
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Page read failed");
                    job.log(format!("failed to read {}: {}", url, e));
                }
            }
            pacing(job, fetch_delay).await?;
        }

        Ok(records)
    }
}

/// Loads `url` and returns its rendered text. A page whose text cannot be
/// read once loaded yields an empty string.
async fn fetch_text(
    driver: &dyn PageDriver,
    url: &str,
    pause: Duration,
) -> Result<String, DriverError> {
    driver.navigate(url).await?;
    driver.wait_settled().await?;
    tokio::time::sleep(pause).await;

    match driver.visible_text().await {
        Ok(text) => Ok(text),
        Err(e) => {
            debug!(url, error = %e, "Visible text unavailable, using empty text");
            Ok(String::new())
        }
    }
}

fn checkpoint(job: &JobHandle) -> Result<(), PipelineError> {
    if job.is_cancelled() {
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

/// Polls `work` until it completes or the job is cancelled. On cancellation
/// `work` is dropped at whatever driver call or pause it is suspended in.
async fn until_cancelled<F: Future>(job: &JobHandle, work: F) -> Result<F::Output, PipelineError> {
    tokio::select! {
        biased;
        _ = job.cancelled() => Err(PipelineError::Cancelled),
        output = work => Ok(output),
    }
}

/// Courtesy delay that ends early when the job is cancelled.
async fn pacing(job: &JobHandle, delay: Duration) -> Result<(), PipelineError> {
    until_cancelled(job, tokio::time::sleep(delay)).await
}

async fn close_session(driver: &dyn PageDriver) {
    if let Err(e) = driver.close().await {
        warn!(error = %e, "Failed to close driver session");
    }
}

fn mark_failed(job: &JobHandle) {
    if let Err(e) = job.advance(JobStatus::Failed) {
        warn!(error = %e, "Could not mark job as failed");
    }
}
