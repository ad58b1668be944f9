// Single-measure estimates, used when only a count is at hand

use super::Tier;

/// Estimate a tier from character count alone
pub fn tier_by_char_count(chars: usize) -> Tier {
    match chars {
        0..=99 => Tier::Miniature,
        100..=299 => Tier::Small,
        300..=699 => Tier::Medium,
        700..=1199 => Tier::Large,
        _ => Tier::Huge,
    }
}

/// Estimate a tier from non-blank line count alone
pub fn tier_by_line_count(lines: usize) -> Tier {
    match lines {
        0..=3 => Tier::Miniature,
        4..=8 => Tier::Small,
        9..=15 => Tier::Medium,
        16..=25 => Tier::Large,
        _ => Tier::Huge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_count_boundaries() {
        assert_eq!(tier_by_char_count(0), Tier::Miniature);
        assert_eq!(tier_by_char_count(99), Tier::Miniature);
        assert_eq!(tier_by_char_count(100), Tier::Small);
        assert_eq!(tier_by_char_count(300), Tier::Medium);
        assert_eq!(tier_by_char_count(1199), Tier::Large);
        assert_eq!(tier_by_char_count(1200), Tier::Huge);
    }

    #[test]
    fn test_line_count_boundaries() {
        assert_eq!(tier_by_line_count(3), Tier::Miniature);
        assert_eq!(tier_by_line_count(4), Tier::Small);
        assert_eq!(tier_by_line_count(15), Tier::Medium);
        assert_eq!(tier_by_line_count(25), Tier::Large);
        assert_eq!(tier_by_line_count(26), Tier::Huge);
    }
}
