//! Structured case record produced by the field extractor.

use serde::{Deserialize, Serialize};

/// CSV column names, in export order.
pub const CSV_COLUMNS: [&str; 11] = [
    "system",
    "instance",
    "court",
    "case_number",
    "decision_date",
    "outcome",
    "region",
    "url",
    "quote_25w",
    "norms",
    "source",
];

/// Procedural system every harvested case belongs to.
pub const SYSTEM_ARBITRAZH: &str = "АПК";

/// Provenance tag for records built from rendered page text.
pub const SOURCE_VISIBLE_TEXT: &str = "visible_text";

/// Metadata of one court case. Missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub system: String,
    pub instance: String,
    pub court: String,
    pub case_number: String,
    pub decision_date: String,
    /// Not populated by any rule yet; kept so the CSV schema stays fixed.
    pub outcome: String,
    /// Not populated by any rule yet; kept so the CSV schema stays fixed.
    pub region: String,
    pub url: String,
    pub quote_25w: String,
    pub norms: String,
    pub source: String,
}

/// Key used to recognize duplicate records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub system: String,
    pub instance: String,
    pub case_number: String,
    pub decision_date: String,
}

impl IdentityKey {
    /// True when every component is empty.
    pub fn is_empty(&self) -> bool {
        self.system.is_empty()
            && self.instance.is_empty()
            && self.case_number.is_empty()
            && self.decision_date.is_empty()
    }
}

impl CaseRecord {
    pub fn identity(&self) -> IdentityKey {
        IdentityKey {
            system: self.system.clone(),
            instance: self.instance.clone(),
            case_number: self.case_number.clone(),
            decision_date: self.decision_date.clone(),
        }
    }

    /// Field values in [`CSV_COLUMNS`] order.
    pub fn as_row(&self) -> [&str; 11] {
        [
            &self.system,
            &self.instance,
            &self.court,
            &self.case_number,
            &self.decision_date,
            &self.outcome,
            &self.region,
            &self.url,
            &self.quote_25w,
            &self.norms,
            &self.source,
        ]
    }
}
