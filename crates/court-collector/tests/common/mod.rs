//! Shared test utilities for court-collector integration tests.
//!
//! - `Site` / `ScriptedLauncher`: an in-memory page-automation driver
//! - builders for configs, anchors and decision texts
//! - `TestHarness`: a `JobService` writing into a temp directory

pub mod builders;
pub mod driver;
pub mod harness;

pub use builders::*;
pub use driver::{ScriptedLauncher, Site};
pub use harness::TestHarness;
