//! Headless Chromium driver backed by `chromiumoxide`.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Anchor, DriverLauncher, PageDriver};
use crate::error::DriverError;

const ANCHORS_JS: &str = "Array.from(document.querySelectorAll('a')).map(a => ({ \
     text: (a.innerText || '').trim(), href: a.getAttribute('href') }))";

const VISIBLE_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

fn browser_err(e: impl std::fmt::Display) -> DriverError {
    DriverError::Browser(e.to_string())
}

/// Builds a JS expression resolving `selector` (CSS or `text=`) and then
/// evaluating `action` with the element bound to `el` (possibly null).
fn locate_js(selector: &str, action: &str) -> Result<String, DriverError> {
    let quoted = serde_json::to_string(selector).map_err(browser_err)?;
    Ok(format!(
        "(() => {{ \
            const sel = {quoted}; \
            let el = null; \
            if (sel.startsWith('text=')) {{ \
                const wanted = sel.slice(5); \
                el = Array.from(document.querySelectorAll('a, button, span, li, div')) \
                    .find(e => (e.innerText || '').trim() === wanted) || null; \
            }} else {{ \
                el = document.querySelector(sel); \
            }} \
            {action} \
        }})()"
    ))
}

/// Launches one headless Chromium per session.
pub struct ChromiumLauncher {
    pub headless: bool,
    pub settle_timeout: Duration,
}

impl Default for ChromiumLauncher {
    fn default() -> Self {
        Self {
            headless: true,
            settle_timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait]
impl DriverLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn PageDriver>, DriverError> {
        let mut builder = BrowserConfig::builder();
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(DriverError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(browser_err)?;

        Ok(Box::new(ChromiumDriver {
            browser: Mutex::new(Some(browser)),
            page,
            handler_task: std::sync::Mutex::new(Some(handler_task)),
            settle_timeout: self.settle_timeout,
        }))
    }
}

pub struct ChromiumDriver {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler_task: std::sync::Mutex<Option<JoinHandle<()>>>,
    settle_timeout: Duration,
}

impl ChromiumDriver {
    async fn eval_bool(&self, selector: &str, action: &str) -> Result<bool, DriverError> {
        let js = locate_js(selector, action)?;
        self.page
            .evaluate(js)
            .await
            .map_err(browser_err)?
            .into_value::<bool>()
            .map_err(browser_err)
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn fill_and_submit(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| DriverError::ElementNotFound {
                    selector: selector.to_string(),
                })?;

        element.click().await.map_err(browser_err)?;
        element.type_str(text).await.map_err(browser_err)?;
        element.press_key("Enter").await.map_err(browser_err)?;
        Ok(())
    }

    async fn list_anchors(&self) -> Result<Vec<Anchor>, DriverError> {
        self.page
            .evaluate(ANCHORS_JS)
            .await
            .map_err(browser_err)?
            .into_value::<Vec<Anchor>>()
            .map_err(browser_err)
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, DriverError> {
        self.eval_bool(
            selector,
            "return !!el && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);",
        )
        .await
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        let clicked = self
            .eval_bool(selector, "if (!el) { return false; } el.click(); return true;")
            .await?;

        if clicked {
            Ok(())
        } else {
            Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn wait_settled(&self) -> Result<(), DriverError> {
        match tokio::time::timeout(self.settle_timeout, self.page.wait_for_navigation()).await {
            Ok(result) => result.map(|_| ()).map_err(browser_err),
            Err(_) => Err(DriverError::Timeout),
        }
    }

    async fn visible_text(&self) -> Result<String, DriverError> {
        self.page
            .evaluate(VISIBLE_TEXT_JS)
            .await
            .map_err(browser_err)?
            .into_value::<String>()
            .map_err(browser_err)
    }

    async fn close(&self) -> Result<(), DriverError> {
        if let Err(e) = self.page.clone().close().await {
            warn!("Failed to close page: {}", e);
        }

        if let Some(mut browser) = self.browser.lock().await.take() {
            browser.close().await.map_err(browser_err)?;
            if let Err(e) = browser.wait().await {
                warn!("Browser process did not exit cleanly: {}", e);
            }
        }

        let task = match self.handler_task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            task.abort();
        }

        Ok(())
    }
}
