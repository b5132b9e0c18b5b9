//! Difficulty tiers and the max-stand-time policy

use serde::{Deserialize, Serialize};

/// Max stand time used when no tier has been chosen yet
pub const DEFAULT_MAX_STAND_TIME: f32 = 4.0;

/// Route difficulty classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Tutorial,
    Easy,
    Medium,
    Hard,
}

impl Tier {
    /// Tiers a participant can pick on the selector bank
    pub const SELECTABLE: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Tutorial => "Tutorial",
            Tier::Easy => "Easy",
            Tier::Medium => "Medium",
            Tier::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tutorial" => Some(Tier::Tutorial),
            "easy" => Some(Tier::Easy),
            "medium" | "med" => Some(Tier::Medium),
            "hard" => Some(Tier::Hard),
            _ => None,
        }
    }

    /// Seconds a participant may stay engaged on one pad before it turns unstable
    pub fn max_stand_time(&self) -> f32 {
        match self {
            Tier::Easy => 6.0,
            Tier::Medium => 4.0,
            Tier::Hard => 2.5,
            Tier::Tutorial => DEFAULT_MAX_STAND_TIME,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Max stand time for an optional tier (unset falls back to the default)
pub fn max_stand_time(tier: Option<Tier>) -> f32 {
    tier.map_or(DEFAULT_MAX_STAND_TIME, |t| t.max_stand_time())
}
