// Text features the size ladder is evaluated against

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// Bullet or numbered list marker at line start
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*[-•*]\s|^[0-9]+[.)]\s").expect("valid list regex"));

// Whole line in capitals, e.g. a section title
static CAPS_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[A-ZÁÉÍÓÚÑ\s]{5,}$").expect("valid section regex"));

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph regex"));

// "Label: Value"
static LABELLED_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\s*[A-Z]").expect("valid label regex"));

static CAPS_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[A-ZÁÉÍÓÚÑ\s]{10,}").expect("valid heading regex"));

static UNDERLINED_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[A-ZÁÉÍÓÚÑ\s]+\n[-=]+").expect("valid underline regex"));

static PRICE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"S/\.?\s*[0-9]+",
        r"\$\s*[0-9]+",
        r"(?i)[0-9]+\s*soles?",
        r"(?i)precio\s*:?\s*S?/?\.?\s*[0-9]+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid price regex"))
    .collect()
});

/// Measurements taken from a listing before it is placed on the tier ladder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextFeatures {
    /// Non-blank lines in the raw body
    pub effective_lines: usize,
    /// Characters in `title + ' ' + normalized body`
    pub char_count: usize,
    /// Whitespace-separated words in `title + ' ' + normalized body`
    pub word_count: usize,
    pub has_complex_structure: bool,
    pub has_emphasized_headings: bool,
    pub price_mentions: usize,
}

impl TextFeatures {
    /// Extract features from a listing body and optional title
    pub fn extract(text: &str, title: Option<&str>) -> Self {
        let normalized = normalize(text);
        // An empty title adds nothing, not even the joining space
        let full = match title.filter(|t| !t.is_empty()) {
            Some(title) => format!("{} {}", title, normalized),
            None => normalized,
        };

        Self {
            effective_lines: count_effective_lines(text),
            char_count: full.chars().count(),
            word_count: full.split_whitespace().count(),
            has_complex_structure: has_complex_structure(text),
            has_emphasized_headings: has_emphasized_headings(text),
            price_mentions: count_price_mentions(&full),
        }
    }
}

/// Collapse whitespace runs to a single space and trim
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn count_effective_lines(text: &str) -> usize {
    text.split('\n').filter(|line| !line.trim().is_empty()).count()
}

pub fn has_complex_structure(text: &str) -> bool {
    LIST_MARKER.is_match(text)
        || CAPS_SECTION.is_match(text)
        || PARAGRAPH_BREAK.is_match(text)
        || LABELLED_FIELD.is_match(text)
}

pub fn has_emphasized_headings(text: &str) -> bool {
    CAPS_HEADING.is_match(text) || UNDERLINED_HEADING.is_match(text)
}

/// Matches of every price pattern, summed; one price may count more than once
pub fn count_price_mentions(text: &str) -> usize {
    PRICE_PATTERNS
        .iter()
        .map(|pattern| pattern.find_iter(text).count())
        .sum()
}
