pub mod error;
pub mod runner;

pub use error::PipelineError;
pub use runner::JobRunner;
