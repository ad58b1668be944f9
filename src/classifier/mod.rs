// Visual size classification of listing text

pub mod features;
pub mod heuristics;
pub mod tier;

pub use features::TextFeatures;
pub use heuristics::{tier_by_char_count, tier_by_line_count};
pub use tier::Tier;

/// Tier returned for empty listings; larger than miniature so nothing under-renders
pub const EMPTY_LISTING_TIER: Tier = Tier::Small;

/// Classify a listing body (and optional title) into a visual size tier.
///
/// Bands are tried in ascending order and the first match wins. Two bands can
/// escalate one step when the text is dense with structure and prices.
/// Anything that falls outside every band lands on [`Tier::Large`].
pub fn classify(text: &str, title: Option<&str>) -> Tier {
    classify_with_features(text, title).0
}

/// Classify and also return the features the decision was based on
pub fn classify_with_features(text: &str, title: Option<&str>) -> (Tier, TextFeatures) {
    let features = TextFeatures::extract(text, title);

    // Whitespace-only bodies count as empty too, so they get the empty-listing
    // tier rather than reaching the miniature band with zero lines.
    if text.trim().is_empty() {
        return (EMPTY_LISTING_TIER, features);
    }

    (classify_features(&features), features)
}

/// Place already-extracted features on the tier ladder
pub fn classify_features(f: &TextFeatures) -> Tier {
    let lines = f.effective_lines;
    let chars = f.char_count;
    let words = f.word_count;

    if lines <= 3 && chars < 150 && words < 25 {
        return Tier::Miniature;
    }

    if lines <= 8 && chars < 400 && words < 60 {
        return Tier::Small;
    }

    if lines <= 15 && chars < 700 && words < 120 {
        if f.has_complex_structure && lines > 12 && f.price_mentions > 2 {
            return Tier::Large;
        }
        return Tier::Medium;
    }

    if lines <= 25 && chars < 1200 && words < 200 {
        if f.has_complex_structure
            && f.has_emphasized_headings
            && f.price_mentions > 4
            && lines > 22
            && words > 180
        {
            return Tier::Huge;
        }
        return Tier::Large;
    }

    if lines > 25 && chars > 1200 && words > 200 {
        return Tier::Huge;
    }

    // Outside every band (e.g. one very long line). Kept as large, not huge.
    Tier::Large
}
