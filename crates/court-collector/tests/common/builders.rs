//! Builders for job configs, anchors and document texts.

#![allow(dead_code)]

use court_collector::driver::Anchor;
use court_collector::CollectConfig;

pub const KAD: &str = "https://kad.arbitr.ru/";
pub const RAS: &str = "https://ras.arbitr.ru/";

/// Builder for `CollectConfig` with fast pacing.
pub struct CollectConfigBuilder {
    config: CollectConfig,
}

impl CollectConfigBuilder {
    pub fn new() -> Self {
        let mut config = CollectConfig::with_queries(Vec::<String>::new());
        config.pause_sec = 0;
        Self { config }
    }

    pub fn query(mut self, query: &str) -> Self {
        self.config.queries.push(query.to_string());
        self
    }

    pub fn max_links(mut self, max_links: usize) -> Self {
        self.config.max_links_per_query = max_links;
        self
    }

    pub fn pause_sec(mut self, pause_sec: u64) -> Self {
        self.config.pause_sec = pause_sec;
        self
    }

    pub fn build(self) -> CollectConfig {
        self.config
    }
}

impl Default for CollectConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// KAD card link, `https://kad.arbitr.ru/Card/<id>`.
pub fn kad_card(id: &str) -> Anchor {
    Anchor::new(id, format!("https://kad.arbitr.ru/Card/{}", id))
}

/// Site-relative RAS document link, `/Document/<id>`.
pub fn ras_document(id: &str) -> Anchor {
    Anchor::new(id, format!("/Document/{}", id))
}

/// Navigation chrome present on every result page.
pub fn chrome_anchors() -> Vec<Anchor> {
    vec![
        Anchor::new("Главная", "/"),
        Anchor::new("Помощь", "https://kad.arbitr.ru/Help"),
        Anchor {
            text: "Следующая".to_string(),
            href: None,
        },
    ]
}

/// Rendered text of a decision page.
pub fn decision_text(case_number: &str, date: &str) -> String {
    format!(
        "Постановление от {date}\n\
         Арбитражный суд Уральского округа\n\
         Дело № {case_number}\n\
         Суд кассационной инстанции, оценив доказательства, отклонил доводы налогоплательщика.\n\
         Доначисление произведено на основании ст. 54.1 НК РФ и ст.\u{a0}171 НК РФ."
    )
}
