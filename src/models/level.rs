// file: src/models/level.rs
// description: CEFR levels and the generation knobs that shape prompts
// reference: Common European Framework of Reference for Languages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    #[serde(rename = "B1+")]
    B1Plus,
    B2,
    C1,
    C2,
}

/// Coarse grouping used by the tier instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelBand {
    Basic,
    Intermediate,
    Advanced,
}

impl CefrLevel {
    pub const ALL: [CefrLevel; 7] = [
        CefrLevel::A1,
        CefrLevel::A2,
        CefrLevel::B1,
        CefrLevel::B1Plus,
        CefrLevel::B2,
        CefrLevel::C1,
        CefrLevel::C2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B1Plus => "B1+",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        }
    }

    pub fn band(&self) -> LevelBand {
        match self {
            CefrLevel::A1 | CefrLevel::A2 => LevelBand::Basic,
            CefrLevel::B1 | CefrLevel::B1Plus => LevelBand::Intermediate,
            CefrLevel::B2 | CefrLevel::C1 | CefrLevel::C2 => LevelBand::Advanced,
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CefrLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        CefrLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| format!("unknown CEFR level '{}' (expected A1, A2, B1, B1+, B2, C1 or C2)", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CefrTier {
    Lower,
    Neutral,
    #[default]
    Upper,
}

impl CefrTier {
    /// Prefix placed in front of the level in the class description.
    pub fn modifier(&self) -> &'static str {
        match self {
            CefrTier::Lower => "Lower ",
            CefrTier::Neutral => "",
            CefrTier::Upper => "Upper ",
        }
    }
}

impl fmt::Display for CefrTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CefrTier::Lower => "Lower",
            CefrTier::Neutral => "Neutral",
            CefrTier::Upper => "Upper",
        };
        f.write_str(name)
    }
}

impl FromStr for CefrTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lower" => Ok(CefrTier::Lower),
            "neutral" => Ok(CefrTier::Neutral),
            "upper" => Ok(CefrTier::Upper),
            other => Err(format!("unknown tier '{}' (expected lower, neutral or upper)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BloomsLevel {
    #[default]
    Auto,
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl fmt::Display for BloomsLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BloomsLevel::Auto => "Auto",
            BloomsLevel::Remember => "Remember",
            BloomsLevel::Understand => "Understand",
            BloomsLevel::Apply => "Apply",
            BloomsLevel::Analyze => "Analyze",
            BloomsLevel::Evaluate => "Evaluate",
            BloomsLevel::Create => "Create",
        };
        f.write_str(name)
    }
}

impl FromStr for BloomsLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BloomsLevel::Auto),
            "remember" => Ok(BloomsLevel::Remember),
            "understand" => Ok(BloomsLevel::Understand),
            "apply" => Ok(BloomsLevel::Apply),
            "analyze" | "analyse" => Ok(BloomsLevel::Analyze),
            "evaluate" => Ok(BloomsLevel::Evaluate),
            "create" => Ok(BloomsLevel::Create),
            other => Err(format!("unknown Bloom's level '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngagementLevel {
    #[default]
    Balanced,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl fmt::Display for EngagementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngagementLevel::Balanced => "Balanced",
            EngagementLevel::Low => "Low",
            EngagementLevel::Medium => "Medium",
            EngagementLevel::High => "High",
            EngagementLevel::VeryHigh => "Very High",
        };
        f.write_str(name)
    }
}

impl FromStr for EngagementLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match normalized.as_str() {
            "balanced" => Ok(EngagementLevel::Balanced),
            "low" => Ok(EngagementLevel::Low),
            "medium" => Ok(EngagementLevel::Medium),
            "high" => Ok(EngagementLevel::High),
            "veryhigh" => Ok(EngagementLevel::VeryHigh),
            _ => Err(format!("unknown engagement level '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TopicConsistency {
    Strict,
    #[default]
    Neutral,
    Free,
}

impl fmt::Display for TopicConsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TopicConsistency::Strict => "Strict",
            TopicConsistency::Neutral => "Neutral",
            TopicConsistency::Free => "Free",
        };
        f.write_str(name)
    }
}

impl FromStr for TopicConsistency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TopicConsistency::Strict),
            "neutral" => Ok(TopicConsistency::Neutral),
            "free" => Ok(TopicConsistency::Free),
            other => Err(format!("unknown topic consistency '{}'", other)),
        }
    }
}

/// Everything besides the unit itself that changes what the model is asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub level: CefrLevel,
    pub tier: CefrTier,
    pub blooms: BloomsLevel,
    pub engagement: EngagementLevel,
    pub topic_consistency: TopicConsistency,
    pub quality_validation: bool,
    pub academic_background: bool,
    pub naturalness_check: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            level: CefrLevel::B2,
            tier: CefrTier::default(),
            blooms: BloomsLevel::default(),
            engagement: EngagementLevel::default(),
            topic_consistency: TopicConsistency::default(),
            quality_validation: true,
            academic_background: false,
            naturalness_check: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!("b1+".parse::<CefrLevel>().unwrap(), CefrLevel::B1Plus);
        assert_eq!(" C2 ".parse::<CefrLevel>().unwrap(), CefrLevel::C2);
        assert!("D1".parse::<CefrLevel>().is_err());
    }

    #[test]
    fn test_level_bands() {
        assert_eq!(CefrLevel::A2.band(), LevelBand::Basic);
        assert_eq!(CefrLevel::B1Plus.band(), LevelBand::Intermediate);
        assert_eq!(CefrLevel::B2.band(), LevelBand::Advanced);
    }

    #[test]
    fn test_tier_modifier() {
        assert_eq!(CefrTier::Upper.modifier(), "Upper ");
        assert_eq!(CefrTier::Neutral.modifier(), "");
        assert_eq!(CefrTier::Lower.modifier(), "Lower ");
    }

    #[test]
    fn test_engagement_parsing_accepts_spaced_forms() {
        assert_eq!(
            "very high".parse::<EngagementLevel>().unwrap(),
            EngagementLevel::VeryHigh
        );
        assert_eq!(
            "very-high".parse::<EngagementLevel>().unwrap(),
            EngagementLevel::VeryHigh
        );
        assert_eq!(EngagementLevel::VeryHigh.to_string(), "Very High");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&CefrLevel::B1Plus).unwrap();
        assert_eq!(json, "\"B1+\"");
        let engagement: EngagementLevel = serde_json::from_str("\"Very High\"").unwrap();
        assert_eq!(engagement, EngagementLevel::VeryHigh);
    }
}
