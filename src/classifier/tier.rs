use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visual size class of a listing card, ordered from smallest to largest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Miniature,
    Small,
    Medium,
    Large,
    Huge,
}

impl Tier {
    /// All tiers in ascending order
    pub const ALL: [Tier; 5] = [
        Tier::Miniature,
        Tier::Small,
        Tier::Medium,
        Tier::Large,
        Tier::Huge,
    ];

    /// Column value persisted on the listing record
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Miniature => "miniature",
            Tier::Small => "small",
            Tier::Medium => "medium",
            Tier::Large => "large",
            Tier::Huge => "huge",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "miniature" => Ok(Tier::Miniature),
            "small" => Ok(Tier::Small),
            "medium" => Ok(Tier::Medium),
            "large" => Ok(Tier::Large),
            "huge" => Ok(Tier::Huge),
            other => Err(format!("unknown tier: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_ordered() {
        assert!(Tier::Miniature < Tier::Small);
        assert!(Tier::Small < Tier::Medium);
        assert!(Tier::Medium < Tier::Large);
        assert!(Tier::Large < Tier::Huge);

        let mut sorted = Tier::ALL;
        sorted.sort();
        assert_eq!(sorted, Tier::ALL);
    }

    #[test]
    fn test_serializes_as_column_value() {
        assert_eq!(serde_json::to_string(&Tier::Huge).unwrap(), "\"huge\"");
        let tier: Tier = serde_json::from_str("\"miniature\"").unwrap();
        assert_eq!(tier, Tier::Miniature);
    }

    #[test]
    fn test_parse() {
        for tier in Tier::ALL {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
        assert_eq!(" Large ".parse::<Tier>().unwrap(), Tier::Large);
        assert!("gigantic".parse::<Tier>().is_err());
    }
}
