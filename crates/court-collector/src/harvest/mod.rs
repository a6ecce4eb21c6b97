//! Link harvesting: discovering candidate document URLs on a portal's search
//! results without reading their content.

pub mod portal;

pub use portal::{PortalStrategy, NEXT_PAGE_SELECTOR, PORTALS};

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, info_span, Instrument};

use crate::driver::PageDriver;
use crate::error::DriverError;

/// One harvest call: a single query against a single portal.
#[derive(Debug, Clone)]
pub struct HarvestRequest<'a> {
    pub query: &'a str,
    /// Accepted for forward compatibility; portals are not filtered by year.
    pub year_from: i32,
    /// Accepted for forward compatibility; portals are not filtered by instance.
    pub instances: &'a [String],
    pub max_links: usize,
    /// Courtesy delay after each page load.
    pub pause: Duration,
}

/// Collects up to `request.max_links` result URLs for one query on one portal.
///
/// Walks result pages through the portal's next-page control until the cap
/// is reached or no further page is offered.
pub async fn harvest(
    driver: &dyn PageDriver,
    portal: &PortalStrategy,
    request: &HarvestRequest<'_>,
) -> Result<BTreeSet<String>, DriverError> {
    let span = info_span!("harvest", portal = portal.name, query = request.query);
    harvest_pages(driver, portal, request).instrument(span).await
}

async fn harvest_pages(
    driver: &dyn PageDriver,
    portal: &PortalStrategy,
    request: &HarvestRequest<'_>,
) -> Result<BTreeSet<String>, DriverError> {
    driver.navigate(portal.base_url).await?;
    tokio::time::sleep(request.pause).await;

    driver
        .fill_and_submit(portal.search_selector, request.query)
        .await?;
    driver.wait_settled().await?;

    let mut links = BTreeSet::new();
    let mut page = 1usize;

    while links.len() < request.max_links {
        for anchor in driver.list_anchors().await? {
            let Some(href) = anchor.href.as_deref() else {
                continue;
            };
            if let Some(url) = portal.recognize(href) {
                if links.insert(url) {
                    debug!(page, href, "Result link found");
                }
                if links.len() >= request.max_links {
                    break;
                }
            }
        }

        if links.len() >= request.max_links || !driver.is_visible(portal.next_selector).await? {
            break;
        }

        driver.click(portal.next_selector).await?;
        driver.wait_settled().await?;
        tokio::time::sleep(request.pause).await;
        page += 1;
    }

    debug!(pages = page, links = links.len(), "Harvest finished");
    Ok(links)
}
