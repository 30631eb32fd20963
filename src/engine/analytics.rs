use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::item_stats::{Category, ItemStat};
use crate::engine::priority::{Mastery, mastery, overall_accuracy_pct, weak_items};
use crate::engine::trend::{
    PracticePattern, TrendDirection, TrendPeriod, TrendSummary, practice_pattern, trend,
};
use crate::session::record::PracticeSession;

/// Default cache lifetime; staleness within this window is tolerated.
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 60;

const LOW_CONSISTENCY: f64 = 30.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryMastery {
    pub category: Category,
    pub mastery: Mastery,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeakSpot {
    pub item_id: String,
    pub category: Category,
    pub accuracy: f64,
}

/// Per-user analytics bundle; this is the payload the store caches.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub trend: TrendSummary,
    pub pattern: PracticePattern,
    pub mastery: Vec<CategoryMastery>,
    pub weak_spots: Vec<WeakSpot>,
    pub percentile: f64,
    pub insights: Vec<String>,
}

/// Inter-user standing estimate. The engine has no population data, so the
/// default is an explicit heuristic; callers with real comparative
/// statistics plug in their own.
pub trait PercentileEstimator {
    fn estimate(&self, accuracy_pct: f64, total_xp: f64) -> f64;
}

/// Deterministic stand-in: monotonic in both inputs, clamped to 1..=99.
pub struct HeuristicPercentile;

impl PercentileEstimator for HeuristicPercentile {
    fn estimate(&self, accuracy_pct: f64, total_xp: f64) -> f64 {
        let base = 50.0 + (accuracy_pct - 70.0) * 1.2;
        let xp_bonus = (total_xp / 500.0).min(20.0);
        (base + xp_bonus).clamp(1.0, 99.0)
    }
}

pub fn build_report(
    stats: &[ItemStat],
    sessions: &[PracticeSession],
    estimator: &dyn PercentileEstimator,
    now: DateTime<Utc>,
) -> AnalyticsReport {
    let monthly = trend(sessions, TrendPeriod::Month, now);
    let pattern = practice_pattern(sessions, now);

    let mastery: Vec<CategoryMastery> = Category::all()
        .iter()
        .map(|&category| {
            let in_category: Vec<ItemStat> = stats
                .iter()
                .filter(|s| s.category == category)
                .cloned()
                .collect();
            CategoryMastery {
                category,
                mastery: self::mastery(&in_category),
            }
        })
        .collect();

    let weak_spots: Vec<WeakSpot> = weak_items(stats)
        .into_iter()
        .map(|s| WeakSpot {
            item_id: s.item_id.clone(),
            category: s.category,
            accuracy: s.accuracy(),
        })
        .collect();

    let total_xp: f64 = sessions.iter().map(|s| s.score).sum();
    let percentile = estimator.estimate(overall_accuracy_pct(stats), total_xp);
    let insights = insights(&monthly, &pattern, &weak_spots);

    AnalyticsReport {
        trend: monthly,
        pattern,
        mastery,
        weak_spots,
        percentile,
        insights,
    }
}

/// Short, human-readable observations derived from the numbers.
pub fn insights(
    trend: &TrendSummary,
    pattern: &PracticePattern,
    weak_spots: &[WeakSpot],
) -> Vec<String> {
    let mut out = Vec::new();

    match trend.trend {
        TrendDirection::Improving => out.push(format!(
            "Accuracy is up {:.0}% over the period. Keep it going.",
            trend.accuracy_change_pct
        )),
        TrendDirection::Declining => out.push(format!(
            "Accuracy slipped {:.0}% over the period. Shorter, more frequent sessions help.",
            trend.accuracy_change_pct.abs()
        )),
        TrendDirection::Stable => {}
    }

    if let Some(best) = pattern.best_time_of_day {
        out.push(format!("Your accuracy peaks in the {best:?} hours."));
    }

    if pattern.consistency_score < LOW_CONSISTENCY && pattern.sessions_per_week > 0 {
        out.push("Practice has been sporadic; a daily streak compounds fast.".to_string());
    }

    if let Some(worst) = weak_spots.first() {
        out.push(format!(
            "{} items need the most work, starting with {}.",
            worst.category.to_key(),
            worst.item_id
        ));
    }

    out
}

// --- Cache ---

/// Cached analytics plus when it was computed. Freshness is always judged
/// against a caller-supplied `now`; the engine never reads the wall clock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CachedAnalytics {
    pub report: AnalyticsReport,
    pub cached_at: DateTime<Utc>,
}

impl CachedAnalytics {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl_minutes: u64) -> bool {
        now - self.cached_at < Duration::minutes(ttl_minutes as i64)
    }
}
