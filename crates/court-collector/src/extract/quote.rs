use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Maximum number of whitespace-delimited tokens kept in a quote.
pub const QUOTE_MAX_WORDS: usize = 25;

// A sentence (no inner '.') around a judicial-reasoning trigger phrase.
static RE_REASONING: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(
        r"([^.]{10,240}(?:суд.{0,60}указал|оценив доказательства|приш[её]л к выводу)[^.]{0,240}\.)",
    )
    .case_insensitive(true)
    .dot_matches_new_line(true)
    .size_limit(1 << 24)
    .build()
    .unwrap()
});

/// Picks the first reasoning sentence and truncates it to
/// [`QUOTE_MAX_WORDS`] tokens. Returns an empty string when none is found.
pub fn pick_quote(text: &str) -> String {
    let sentence = RE_REASONING
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or("");

    truncate_words(sentence, QUOTE_MAX_WORDS)
}

fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}
