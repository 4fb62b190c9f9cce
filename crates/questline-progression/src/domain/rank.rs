//! Reputation rank names.

use serde::{Deserialize, Serialize};

/// Named reputation standing for levels 1 through 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReputationRank {
    /// Level 1.
    Neutral,
    /// Level 2.
    Friendly,
    /// Level 3.
    Honored,
    /// Level 4.
    Revered,
    /// Level 5.
    Exalted,
    /// Level 6.
    Legendary,
}

impl ReputationRank {
    const LADDER: [Self; 6] = [
        Self::Neutral,
        Self::Friendly,
        Self::Honored,
        Self::Revered,
        Self::Exalted,
        Self::Legendary,
    ];

    /// Rank for a reputation level; out-of-range levels clamp to the ends.
    #[must_use]
    pub fn from_level(level: i32) -> Self {
        let index = usize::try_from(level.saturating_sub(1)).unwrap_or(0);
        Self::LADDER[index.min(Self::LADDER.len() - 1)]
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Friendly => "friendly",
            Self::Honored => "honored",
            Self::Revered => "revered",
            Self::Exalted => "exalted",
            Self::Legendary => "legendary",
        }
    }
}
