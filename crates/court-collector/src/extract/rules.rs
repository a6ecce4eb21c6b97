//! Labeled pattern rules for the scalar case fields.

use std::sync::LazyLock;

use regex::Regex;

static RE_INSTANCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Инстанция[:\s]*([А-ЯA-Za-zа-я\s\-]{3,40})").unwrap());

static RE_COURT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(Арбитражный\s*суд[^\n]{5,120})").unwrap());

// Accepts Latin or Cyrillic "A" prefixes, which look identical on the page.
static RE_CASE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Дело|№\s*дела|Дело\s*№)\s*[:№]*\s*([AА]?\d{1,3}-\d+/\d{4}|\w+-\d+/\d{4})")
        .unwrap()
});

static RE_DECISION_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:дата|от)\s*[:\s]*?(\d{2}[.\-]\d{2}[.\-]\d{4})").unwrap()
});

fn first_group(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn instance(text: &str) -> Option<String> {
    first_group(&RE_INSTANCE, text)
}

pub fn court(text: &str) -> Option<String> {
    first_group(&RE_COURT, text)
}

pub fn case_number(text: &str) -> Option<String> {
    first_group(&RE_CASE_NUMBER, text)
}

pub fn decision_date(text: &str) -> Option<String> {
    first_group(&RE_DECISION_DATE, text)
}
