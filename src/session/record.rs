use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::difficulty::DifficultyTier;
use crate::engine::item_stats::Category;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    QuickFix,
    BalancedGrowth,
    DeepDive,
    Challenge,
    Review,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::QuickFix => "quick_fix",
            SessionKind::BalancedGrowth => "balanced_growth",
            SessionKind::DeepDive => "deep_dive",
            SessionKind::Challenge => "challenge",
            SessionKind::Review => "review",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn all() -> &'static [TimeOfDay] {
        &[
            TimeOfDay::Morning,
            TimeOfDay::Afternoon,
            TimeOfDay::Evening,
            TimeOfDay::Night,
        ]
    }
}

/// One completed practice session. Created once, appended to the capped
/// history log, never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PracticeSession {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub duration_secs: f64,
    pub kind: SessionKind,
    pub score: f64,
    /// 0..=100.
    pub accuracy: f64,
    pub correct_answers: u32,
    pub total_attempts: u32,
    pub item_categories: Vec<Category>,
    pub time_of_day: TimeOfDay,
}

impl PracticeSession {
    /// Build the immutable record from raw session results. Score is the
    /// difficulty-weighted xp earned for the session.
    pub fn from_results(
        kind: SessionKind,
        correct_answers: u32,
        total_attempts: u32,
        duration_secs: f64,
        difficulty: DifficultyTier,
        item_categories: Vec<Category>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let accuracy = if total_attempts > 0 {
            (correct_answers as f64 / total_attempts as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Self {
            id: timestamp.timestamp_millis().to_string(),
            timestamp,
            duration_secs,
            kind,
            score: correct_answers as f64 * 5.0 * difficulty.xp_multiplier(),
            accuracy,
            correct_answers,
            total_attempts,
            item_categories,
            time_of_day: TimeOfDay::from_hour(timestamp.hour()),
        }
    }
}
