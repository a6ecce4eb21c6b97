//! Page-automation driver interface.
//!
//! The pipeline only talks to a browser through [`PageDriver`]; sessions are
//! opened by a [`DriverLauncher`]. Any implementation with these
//! capabilities works, including scripted in-memory drivers for tests.

#[cfg(feature = "chromium")]
pub mod chromium;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// An anchor element as rendered on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub text: String,
    pub href: Option<String>,
}

impl Anchor {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// One open browser page.
///
/// Selectors are CSS selectors; a `text=` prefix selects the element whose
/// visible text equals the remainder.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Types `text` into the element at `selector` and submits it.
    async fn fill_and_submit(&self, selector: &str, text: &str) -> Result<(), DriverError>;

    async fn list_anchors(&self) -> Result<Vec<Anchor>, DriverError>;

    async fn is_visible(&self, selector: &str) -> Result<bool, DriverError>;

    async fn click(&self, selector: &str) -> Result<(), DriverError>;

    /// Waits until network activity and rendering have settled.
    async fn wait_settled(&self) -> Result<(), DriverError>;

    async fn visible_text(&self) -> Result<String, DriverError>;

    /// Tears down the session. The driver must not be used afterwards.
    async fn close(&self) -> Result<(), DriverError>;
}

/// Opens fresh, isolated page-automation sessions.
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PageDriver>, DriverError>;
}
