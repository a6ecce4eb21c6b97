//! Scripted in-memory page-automation driver.
//!
//! A [`Site`] describes what the portals and document pages return; every
//! session launched from a [`ScriptedLauncher`] browses the same site and
//! records what it did, so tests can assert on navigation and session
//! lifecycle without a browser.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use court_collector::driver::{Anchor, DriverLauncher, PageDriver};
use court_collector::harvest::NEXT_PAGE_SELECTOR;
use court_collector::DriverError;

#[derive(Default)]
struct SiteInner {
    /// (portal base URL, query) -> result pages.
    results: Mutex<HashMap<(String, String), Vec<Vec<Anchor>>>>,
    failing_searches: Mutex<HashSet<(String, String)>>,
    documents: Mutex<HashMap<String, String>>,
    unreachable: Mutex<HashSet<String>>,
    fail_launch: AtomicBool,
    launches: AtomicUsize,
    closes: AtomicUsize,
    open_sessions: AtomicUsize,
    max_open_sessions: AtomicUsize,
    page_turns: AtomicUsize,
    visited: Mutex<Vec<String>>,
    searches: Mutex<Vec<(String, String)>>,
}

/// Shared scripted web site.
#[derive(Clone, Default)]
pub struct Site {
    inner: Arc<SiteInner>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result pages shown by `portal_base` after searching for `query`.
    pub fn with_results(self, portal_base: &str, query: &str, pages: Vec<Vec<Anchor>>) -> Self {
        self.inner
            .results
            .lock()
            .unwrap()
            .insert((portal_base.to_string(), query.to_string()), pages);
        self
    }

    /// Makes the search box of `portal_base` unusable for `query`.
    pub fn with_failing_search(self, portal_base: &str, query: &str) -> Self {
        self.inner
            .failing_searches
            .lock()
            .unwrap()
            .insert((portal_base.to_string(), query.to_string()));
        self
    }

    pub fn with_document(self, url: &str, text: &str) -> Self {
        self.inner
            .documents
            .lock()
            .unwrap()
            .insert(url.to_string(), text.to_string());
        self
    }

    /// Navigation to `url` fails.
    pub fn with_unreachable(self, url: &str) -> Self {
        self.inner
            .unreachable
            .lock()
            .unwrap()
            .insert(url.to_string());
        self
    }

    /// Every session launch fails.
    pub fn with_failing_launch(self) -> Self {
        self.inner.fail_launch.store(true, Ordering::SeqCst);
        self
    }

    pub fn launcher(&self) -> Arc<ScriptedLauncher> {
        Arc::new(ScriptedLauncher { site: self.clone() })
    }

    pub fn launches(&self) -> usize {
        self.inner.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    pub fn max_open_sessions(&self) -> usize {
        self.inner.max_open_sessions.load(Ordering::SeqCst)
    }

    /// Successful clicks on the next-page control, across all sessions.
    pub fn page_turns(&self) -> usize {
        self.inner.page_turns.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.inner.visited.lock().unwrap().clone()
    }

    /// (portal base URL, query) pairs in submission order.
    pub fn searches(&self) -> Vec<(String, String)> {
        self.inner.searches.lock().unwrap().clone()
    }
}

pub struct ScriptedLauncher {
    site: Site,
}

#[async_trait]
impl DriverLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn PageDriver>, DriverError> {
        let inner = &self.site.inner;
        if inner.fail_launch.load(Ordering::SeqCst) {
            return Err(DriverError::Launch("chromium executable not found".to_string()));
        }

        inner.launches.fetch_add(1, Ordering::SeqCst);
        let open = inner.open_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        inner.max_open_sessions.fetch_max(open, Ordering::SeqCst);

        Ok(Box::new(ScriptedDriver {
            site: self.site.clone(),
            state: Mutex::new(PageState::default()),
        }))
    }
}

#[derive(Default)]
struct PageState {
    url: String,
    query: Option<String>,
    page: usize,
}

pub struct ScriptedDriver {
    site: Site,
    state: Mutex<PageState>,
}

impl ScriptedDriver {
    fn page_count(&self, state: &PageState) -> usize {
        let Some(query) = &state.query else {
            return 0;
        };
        self.site
            .inner
            .results
            .lock()
            .unwrap()
            .get(&(state.url.clone(), query.clone()))
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.site.inner.visited.lock().unwrap().push(url.to_string());
        if self.site.inner.unreachable.lock().unwrap().contains(url) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }

        let mut state = self.state.lock().unwrap();
        *state = PageState {
            url: url.to_string(),
            query: None,
            page: 0,
        };
        Ok(())
    }

    async fn fill_and_submit(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let key = (state.url.clone(), text.to_string());
        if self.site.inner.failing_searches.lock().unwrap().contains(&key) {
            return Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
            });
        }

        self.site.inner.searches.lock().unwrap().push(key);
        state.query = Some(text.to_string());
        state.page = 0;
        Ok(())
    }

    async fn list_anchors(&self) -> Result<Vec<Anchor>, DriverError> {
        let state = self.state.lock().unwrap();
        let Some(query) = &state.query else {
            return Ok(Vec::new());
        };
        let results = self.site.inner.results.lock().unwrap();
        Ok(results
            .get(&(state.url.clone(), query.clone()))
            .and_then(|pages| pages.get(state.page))
            .cloned()
            .unwrap_or_default())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, DriverError> {
        let state = self.state.lock().unwrap();
        Ok(selector == NEXT_PAGE_SELECTOR && state.page + 1 < self.page_count(&state))
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        if selector == NEXT_PAGE_SELECTOR && state.page + 1 < self.page_count(&state) {
            state.page += 1;
            self.site.inner.page_turns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        } else {
            Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn wait_settled(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn visible_text(&self) -> Result<String, DriverError> {
        let state = self.state.lock().unwrap();
        self.site
            .inner
            .documents
            .lock()
            .unwrap()
            .get(&state.url)
            .cloned()
            .ok_or_else(|| DriverError::Browser("document body not available".to_string()))
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.site.inner.closes.fetch_add(1, Ordering::SeqCst);
        self.site.inner.open_sessions.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
