use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Raw citation forms recognized in text (Tax Code articles and clauses).
static CITATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)ст\.\s?54\.1\s*НК",
        r"(?i)п\.?\s?14\s*ст\.?\s?101\s*НК",
        r"(?i)ст\.\s?169\s*НК",
        r"(?i)ст\.\s?171\s*НК",
        r"(?i)ст\.\s?172\s*НК",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Display form of each citation, keyed by its reference spelling.
const CANONICAL_FORMS: &[(&str, &str)] = &[
    ("ст. 54.1 НК", "НК РФ ст.54.1"),
    ("п.14 ст.101 НК", "НК РФ п.14 ст.101"),
    ("ст. 169 НК", "НК РФ ст.169"),
    ("ст. 171 НК", "НК РФ ст.171"),
    ("ст. 172 НК", "НК РФ ст.172"),
];

/// Separator between canonical tags in the `norms` field.
pub const NORM_DELIMITER: &str = "|";

/// Comparison key for a citation spelling: lowercase, with whitespace
/// (non-breaking spaces included) and dots removed.
fn citation_key(raw: &str) -> String {
    raw.replace('\u{00A0}', " ")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Maps a raw citation to its canonical tag, if it is a known one.
pub fn canonicalize(raw: &str) -> Option<&'static str> {
    let key = citation_key(raw);
    CANONICAL_FORMS
        .iter()
        .find(|(reference, _)| citation_key(reference) == key)
        .map(|(_, canonical)| *canonical)
}

/// Finds every known citation in `text` and returns the canonical tags,
/// deduplicated, sorted case-insensitively and joined with `|`.
pub fn extract_norms(text: &str) -> String {
    let found: BTreeSet<&'static str> = CITATION_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(text))
        .filter_map(|m| canonicalize(m.as_str()))
        .collect();

    let mut tags: Vec<&str> = found.into_iter().collect();
    tags.sort_by_key(|tag| tag.to_lowercase());
    tags.join(NORM_DELIMITER)
}
