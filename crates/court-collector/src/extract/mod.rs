//! Field extraction from rendered page text.
//!
//! The extractor runs an ordered list of named rules over whitespace-normalized
//! text. Each rule is a pure function yielding an optional value for one
//! field; the first rule that yields a value for a field wins.

pub mod norms;
pub mod quote;
pub mod rules;

use std::sync::LazyLock;

use regex::Regex;

use crate::record::{CaseRecord, SOURCE_VISIBLE_TEXT, SYSTEM_ARBITRAZH};

pub use norms::{canonicalize, extract_norms};
pub use quote::{pick_quote, QUOTE_MAX_WORDS};

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Record fields a rule can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Instance,
    Court,
    CaseNumber,
    DecisionDate,
    Outcome,
    Region,
    Quote,
    Norms,
}

/// A named extraction rule.
#[derive(Clone, Copy)]
pub struct ExtractionRule {
    pub name: &'static str,
    pub field: Field,
    pub extract: fn(&str) -> Option<String>,
}

impl ExtractionRule {
    pub const fn new(name: &'static str, field: Field, extract: fn(&str) -> Option<String>) -> Self {
        Self {
            name,
            field,
            extract,
        }
    }
}

impl std::fmt::Debug for ExtractionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionRule")
            .field("name", &self.name)
            .field("field", &self.field)
            .finish()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn quote_rule(text: &str) -> Option<String> {
    non_empty(pick_quote(text))
}

fn norms_rule(text: &str) -> Option<String> {
    non_empty(extract_norms(text))
}

/// Built-in rules, in evaluation order.
pub const DEFAULT_RULES: &[ExtractionRule] = &[
    ExtractionRule::new("instance", Field::Instance, rules::instance),
    ExtractionRule::new("court", Field::Court, rules::court),
    ExtractionRule::new("case_number", Field::CaseNumber, rules::case_number),
    ExtractionRule::new("decision_date", Field::DecisionDate, rules::decision_date),
    ExtractionRule::new("quote", Field::Quote, quote_rule),
    ExtractionRule::new("norms", Field::Norms, norms_rule),
];

/// Collapses every whitespace run (line breaks, tabs) into a single space.
pub fn normalize_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").into_owned()
}

pub struct FieldExtractor {
    rules: Vec<ExtractionRule>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

impl FieldExtractor {
    pub fn new(rules: Vec<ExtractionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    /// Builds a record for `url` from its raw page text. Never fails;
    /// unmatched fields stay empty.
    pub fn extract(&self, url: &str, raw_text: &str) -> CaseRecord {
        let text = normalize_whitespace(raw_text);

        let mut record = CaseRecord {
            system: SYSTEM_ARBITRAZH.to_string(),
            url: url.to_string(),
            source: SOURCE_VISIBLE_TEXT.to_string(),
            ..Default::default()
        };

        for rule in &self.rules {
            let slot = field_mut(&mut record, rule.field);
            if !slot.is_empty() {
                continue;
            }
            if let Some(value) = (rule.extract)(&text) {
                *slot = value;
            }
        }

        record
    }
}

fn field_mut(record: &mut CaseRecord, field: Field) -> &mut String {
    match field {
        Field::Instance => &mut record.instance,
        Field::Court => &mut record.court,
        Field::CaseNumber => &mut record.case_number,
        Field::DecisionDate => &mut record.decision_date,
        Field::Outcome => &mut record.outcome,
        Field::Region => &mut record.region,
        Field::Quote => &mut record.quote_25w,
        Field::Norms => &mut record.norms,
    }
}
