//! Per-portal parameters for the link harvester.

/// Selector of the "next page" control shared by both portals.
pub const NEXT_PAGE_SELECTOR: &str = "text=Следующая";

/// Everything that differs between two portals' result pages.
#[derive(Debug, Clone, Copy)]
pub struct PortalStrategy {
    /// Short tag used in log lines and spans.
    pub name: &'static str,
    pub base_url: &'static str,
    pub search_selector: &'static str,
    pub next_selector: &'static str,
    /// Returns the absolute result URL for an anchor `href`, or `None` if the
    /// anchor is not a result link.
    pub recognize: fn(&str) -> Option<String>,
}

impl PortalStrategy {
    /// Card-file portal (kad.arbitr.ru).
    pub const fn kad() -> Self {
        Self {
            name: "KAD",
            base_url: "https://kad.arbitr.ru/",
            search_selector: "input[placeholder='Поиск по делам']",
            next_selector: NEXT_PAGE_SELECTOR,
            recognize: recognize_kad,
        }
    }

    /// Decision-archive portal (ras.arbitr.ru).
    pub const fn ras() -> Self {
        Self {
            name: "RAS",
            base_url: "https://ras.arbitr.ru/",
            search_selector: "input[type='search']",
            next_selector: NEXT_PAGE_SELECTOR,
            recognize: recognize_ras,
        }
    }

    pub fn recognize(&self, href: &str) -> Option<String> {
        (self.recognize)(href)
    }
}

/// Portals in the order they are harvested for every query.
pub const PORTALS: [PortalStrategy; 2] = [PortalStrategy::kad(), PortalStrategy::ras()];

fn recognize_kad(href: &str) -> Option<String> {
    (href.starts_with("http") && href.contains("Card")).then(|| href.to_string())
}

const RAS_ORIGIN: &str = "https://ras.arbitr.ru";

fn recognize_ras(href: &str) -> Option<String> {
    if !(href.contains("/Document") || href.contains("/Ras")) {
        return None;
    }

    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("{}{}", RAS_ORIGIN, href)
    } else {
        href.to_string()
    };
    Some(absolute)
}
