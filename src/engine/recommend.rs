use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::engine::difficulty::DifficultyTier;
use crate::engine::item_stats::{CHALLENGE_CATEGORIES, Category, ItemStat};
use crate::engine::priority::improvement_areas;
use crate::engine::skill_graph::LearningPath;
use crate::session::history::SessionHistory;
use crate::session::record::SessionKind;

pub const XP_PER_EXERCISE: f64 = 5.0;
const CHALLENGE_STREAK_MIN: u32 = 3;

/// How the long-session branch picks between challenge and review.
/// `Random` keeps the coin flip; the other variants exist so callers and
/// tests can pin the outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LongSessionPolicy {
    #[default]
    Random,
    PreferChallenge,
    PreferReview,
}

impl LongSessionPolicy {
    fn wants_challenge(self) -> bool {
        match self {
            LongSessionPolicy::Random => SmallRng::from_entropy().gen_bool(0.5),
            LongSessionPolicy::PreferChallenge => true,
            LongSessionPolicy::PreferReview => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Exercise {
    pub category: Category,
    pub count: u32,
    pub difficulty: DifficultyTier,
}

/// Concrete, time-boxed plan for the next practice session.
#[derive(Clone, Debug)]
pub struct SessionPlan {
    pub kind: SessionKind,
    pub duration_minutes: u32,
    pub categories: Vec<Category>,
    pub exercises: Vec<Exercise>,
    pub expected_xp: f64,
}

/// Assemble a session plan for the given time budget.
pub fn recommend(
    budget_minutes: u32,
    stats: &[ItemStat],
    history: &SessionHistory,
    path: &LearningPath,
    fallback: Category,
    policy: LongSessionPolicy,
    now: DateTime<Utc>,
) -> SessionPlan {
    let areas = improvement_areas(stats);
    let current_tier = path.difficulty.tier;

    match budget_minutes {
        0..=5 => {
            let category = areas.first().copied().unwrap_or(fallback);
            plan(
                SessionKind::QuickFix,
                budget_minutes,
                vec![Exercise {
                    category,
                    count: 10,
                    difficulty: DifficultyTier::Beginner,
                }],
            )
        }
        6..=15 => {
            let categories = padded(&areas, 2, fallback);
            let exercises = categories
                .iter()
                .zip([15u32, 10])
                .map(|(&category, count)| Exercise {
                    category,
                    count,
                    difficulty: current_tier,
                })
                .collect();
            plan(SessionKind::BalancedGrowth, budget_minutes, exercises)
        }
        16..=30 => {
            let categories = padded(&areas, 3, fallback);
            let tiers = [
                DifficultyTier::Beginner,
                DifficultyTier::Intermediate,
                current_tier,
            ];
            let exercises = categories
                .iter()
                .zip([20u32, 15, 15])
                .zip(tiers)
                .map(|((&category, count), difficulty)| Exercise {
                    category,
                    count,
                    difficulty,
                })
                .collect();
            plan(SessionKind::DeepDive, budget_minutes, exercises)
        }
        _ => {
            if history.current_streak(now) >= CHALLENGE_STREAK_MIN && policy.wants_challenge() {
                let exercises = CHALLENGE_CATEGORIES
                    .iter()
                    .map(|&category| Exercise {
                        category,
                        count: 10,
                        difficulty: DifficultyTier::Expert,
                    })
                    .collect();
                plan(SessionKind::Challenge, budget_minutes, exercises)
            } else {
                let categories = if areas.is_empty() { vec![fallback] } else { areas };
                let exercises = categories
                    .iter()
                    .map(|&category| Exercise {
                        category,
                        count: 12,
                        difficulty: DifficultyTier::Intermediate,
                    })
                    .collect();
                plan(SessionKind::Review, budget_minutes, exercises)
            }
        }
    }
}

fn plan(kind: SessionKind, duration_minutes: u32, exercises: Vec<Exercise>) -> SessionPlan {
    SessionPlan {
        kind,
        duration_minutes,
        categories: exercises.iter().map(|e| e.category).collect(),
        expected_xp: expected_xp(&exercises),
        exercises,
    }
}

/// Improvement areas first, padded with default categories up to `want`.
fn padded(areas: &[Category], want: usize, fallback: Category) -> Vec<Category> {
    let mut categories: Vec<Category> = areas.iter().copied().take(want).collect();
    for &candidate in std::iter::once(&fallback).chain(Category::all()) {
        if categories.len() >= want {
            break;
        }
        if !categories.contains(&candidate) {
            categories.push(candidate);
        }
    }
    categories
}

pub fn expected_xp(exercises: &[Exercise]) -> f64 {
    exercises
        .iter()
        .map(|e| e.count as f64 * XP_PER_EXERCISE * e.difficulty.xp_multiplier())
        .sum()
}
