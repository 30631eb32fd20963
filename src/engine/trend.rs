use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::session::record::{PracticeSession, TimeOfDay};

/// Accuracy change beyond which a trend stops being "stable". Contract
/// value, not tunable per call.
pub const TREND_THRESHOLD_PCT: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrendPeriod {
    Week,
    Month,
    All,
}

impl TrendPeriod {
    fn window_days(self) -> Option<i64> {
        match self {
            TrendPeriod::Week => Some(7),
            TrendPeriod::Month => Some(30),
            TrendPeriod::All => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

/// Per-day mean accuracy and score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub accuracy: f64,
    pub score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrendSummary {
    pub accuracy_change_pct: f64,
    pub score_change: f64,
    pub trend: TrendDirection,
    pub daily_points: Vec<DailyPoint>,
}

impl TrendSummary {
    pub fn flat() -> Self {
        Self {
            accuracy_change_pct: 0.0,
            score_change: 0.0,
            trend: TrendDirection::Stable,
            daily_points: Vec::new(),
        }
    }
}

/// Direction and magnitude of performance change over the period: sessions
/// are bucketed by calendar day, the day series is split at its midpoint,
/// and the two halves' means are compared.
pub fn trend(sessions: &[PracticeSession], period: TrendPeriod, now: DateTime<Utc>) -> TrendSummary {
    let cutoff = period.window_days().map(|d| now - Duration::days(d));

    let mut by_day: BTreeMap<NaiveDate, (f64, f64, usize)> = BTreeMap::new();
    for session in sessions {
        if let Some(cutoff) = cutoff
            && session.timestamp < cutoff
        {
            continue;
        }
        let entry = by_day.entry(session.timestamp.date_naive()).or_default();
        entry.0 += session.accuracy;
        entry.1 += session.score;
        entry.2 += 1;
    }
    if by_day.is_empty() {
        return TrendSummary::flat();
    }

    let daily_points: Vec<DailyPoint> = by_day
        .into_iter()
        .map(|(date, (acc, score, n))| DailyPoint {
            date,
            accuracy: acc / n as f64,
            score: score / n as f64,
        })
        .collect();

    let mid = daily_points.len() / 2;
    let (first, second) = daily_points.split_at(mid);
    if first.is_empty() || second.is_empty() {
        return TrendSummary {
            accuracy_change_pct: 0.0,
            score_change: 0.0,
            trend: TrendDirection::Stable,
            daily_points,
        };
    }

    let first_acc = mean(first.iter().map(|p| p.accuracy));
    let second_acc = mean(second.iter().map(|p| p.accuracy));
    let first_score = mean(first.iter().map(|p| p.score));
    let second_score = mean(second.iter().map(|p| p.score));

    let accuracy_change_pct = if first_acc == 0.0 {
        0.0
    } else {
        (second_acc - first_acc) / first_acc * 100.0
    };

    let trend = if accuracy_change_pct > TREND_THRESHOLD_PCT {
        TrendDirection::Improving
    } else if accuracy_change_pct < -TREND_THRESHOLD_PCT {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    TrendSummary {
        accuracy_change_pct,
        score_change: second_score - first_score,
        trend,
        daily_points,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 { 0.0 } else { sum / n as f64 }
}

// --- Practice pattern ---

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PracticePattern {
    /// Time of day with the highest mean accuracy, if any sessions exist.
    pub best_time_of_day: Option<TimeOfDay>,
    /// Mean session duration in minutes.
    pub optimal_session_minutes: f64,
    /// 0..=100; saturates at roughly nine practice days per month.
    pub consistency_score: f64,
    /// Sessions in the last seven days.
    pub sessions_per_week: usize,
}

pub fn practice_pattern(sessions: &[PracticeSession], now: DateTime<Utc>) -> PracticePattern {
    let best_time_of_day = TimeOfDay::all()
        .iter()
        .filter_map(|&tod| {
            let accs: Vec<f64> = sessions
                .iter()
                .filter(|s| s.time_of_day == tod)
                .map(|s| s.accuracy)
                .collect();
            if accs.is_empty() {
                None
            } else {
                Some((tod, mean(accs.into_iter())))
            }
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(tod, _)| tod);

    let optimal_session_minutes = mean(sessions.iter().map(|s| s.duration_secs / 60.0));

    let month_cutoff = now - Duration::days(30);
    let last_30 = sessions
        .iter()
        .filter(|s| s.timestamp >= month_cutoff)
        .count();
    let consistency_score = (last_30 as f64 / 30.0 * 100.0 * 3.33).min(100.0);

    let week_cutoff = now - Duration::days(7);
    let sessions_per_week = sessions
        .iter()
        .filter(|s| s.timestamp >= week_cutoff)
        .count();

    PracticePattern {
        best_time_of_day,
        optimal_session_minutes,
        consistency_score,
        sessions_per_week,
    }
}
