pub mod api;
pub mod broadcast;
pub mod config;
pub mod dedupe;
pub mod driver;
pub mod error;
pub mod export;
pub mod extract;
pub mod harvest;
pub mod pipeline;
pub mod record;

pub use api::{ApiError, JobService};
pub use broadcast::{JobProgressBroadcaster, JobProgressEvent, JobStatus, JobStore, JobView};
pub use config::{load_collect_config, load_service_config, CollectConfig, ServiceConfig};
pub use dedupe::dedupe;
pub use driver::{Anchor, DriverLauncher, PageDriver};
pub use error::{CollectorError, ConfigError, DriverError, ExportError, JobError, Result};
pub use export::export_csv;
pub use extract::FieldExtractor;
pub use harvest::{harvest, HarvestRequest, PortalStrategy};
pub use pipeline::{JobRunner, PipelineError};
pub use record::{CaseRecord, CSV_COLUMNS};
