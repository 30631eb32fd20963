use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::trend::TrendSummary;

/// Accuracy drop (in percent change) that triggers a one-step downgrade.
pub const DOWNGRADE_THRESHOLD_PCT: f64 = -10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl DifficultyTier {
    pub fn to_key(self) -> &'static str {
        match self {
            DifficultyTier::Beginner => "beginner",
            DifficultyTier::Intermediate => "intermediate",
            DifficultyTier::Advanced => "advanced",
            DifficultyTier::Expert => "expert",
            DifficultyTier::Master => "master",
        }
    }

    pub fn xp_multiplier(self) -> f64 {
        match self {
            DifficultyTier::Beginner => 1.0,
            DifficultyTier::Intermediate => 1.5,
            DifficultyTier::Advanced => 2.0,
            DifficultyTier::Expert => 2.5,
            DifficultyTier::Master => 3.0,
        }
    }

    /// One tier down, floored at Beginner.
    pub fn step_down(self) -> DifficultyTier {
        match self {
            DifficultyTier::Beginner | DifficultyTier::Intermediate => DifficultyTier::Beginner,
            DifficultyTier::Advanced => DifficultyTier::Intermediate,
            DifficultyTier::Expert => DifficultyTier::Advanced,
            DifficultyTier::Master => DifficultyTier::Expert,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DifficultyState {
    pub tier: DifficultyTier,
    pub reason: String,
    pub last_adjusted: DateTime<Utc>,
}

/// Base-tier thresholds, highest first; first row where both
/// `total_xp > xp` and `accuracy >= acc` wins.
const BASE_TIERS: [(f64, f64, DifficultyTier); 4] = [
    (10_000.0, 90.0, DifficultyTier::Master),
    (5_000.0, 85.0, DifficultyTier::Expert),
    (2_000.0, 75.0, DifficultyTier::Advanced),
    (500.0, 65.0, DifficultyTier::Intermediate),
];

/// Pick the working difficulty from cumulative performance, then apply at
/// most one downgrade step when the recent trend shows a sharp drop.
pub fn adaptive_difficulty(
    total_xp: f64,
    accuracy_pct: f64,
    trend: &TrendSummary,
    now: DateTime<Utc>,
) -> DifficultyState {
    let base = BASE_TIERS
        .iter()
        .find(|(xp, acc, _)| total_xp > *xp && accuracy_pct >= *acc)
        .map(|&(_, _, tier)| tier)
        .unwrap_or(DifficultyTier::Beginner);

    if trend.accuracy_change_pct < DOWNGRADE_THRESHOLD_PCT {
        DifficultyState {
            tier: base.step_down(),
            reason: format!(
                "accuracy down {:.0}% over recent sessions",
                trend.accuracy_change_pct.abs()
            ),
            last_adjusted: now,
        }
    } else {
        DifficultyState {
            tier: base,
            reason: format!("{total_xp:.0} xp at {accuracy_pct:.0}% accuracy"),
            last_adjusted: now,
        }
    }
}
