use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::engine::item_stats::{Category, ItemStat, STRONG_ACCURACY, WEAK_ACCURACY, advance_interval};

const NEVER_PRACTICED_BONUS: f64 = 40.0;
const MAX_RECENCY_BONUS: f64 = 30.0;
const MAX_ATTEMPTS_BONUS: f64 = 20.0;
/// Attempts needed before an item counts toward mastery or weak-area calls.
pub const MIN_RATED_ATTEMPTS: u32 = 3;

/// Transient ranking entry; recomputed on demand, never persisted.
#[derive(Clone, Debug)]
pub struct PriorityItem {
    pub item_id: String,
    pub category: Category,
    pub accuracy: f64,
    pub total_attempts: u32,
    pub priority: f64,
    pub interval_index: usize,
}

/// Rank items by how urgently they need practice, most urgent first.
///
/// Unattempted items are excluded entirely. The sort is stable, so two items
/// with equal scores keep their input order.
pub fn compute_priority_queue(stats: &[ItemStat], now: DateTime<Utc>) -> Vec<PriorityItem> {
    let mut queue: Vec<PriorityItem> = stats
        .iter()
        .filter(|s| s.total >= 1)
        .map(|s| {
            let accuracy = s.accuracy();
            let mut priority = 0.0;

            if accuracy < WEAK_ACCURACY {
                priority += (1.0 - accuracy) * 100.0;
            } else if accuracy < STRONG_ACCURACY {
                priority += (1.0 - accuracy) * 50.0;
            }

            if s.total >= MIN_RATED_ATTEMPTS && accuracy < STRONG_ACCURACY {
                priority += (s.total as f64).min(MAX_ATTEMPTS_BONUS);
            }

            priority += match s.last_practiced {
                Some(last) => {
                    let days = (now - last).num_days().max(0) as f64;
                    (days * 2.0).min(MAX_RECENCY_BONUS)
                }
                None => NEVER_PRACTICED_BONUS,
            };

            PriorityItem {
                item_id: s.item_id.clone(),
                category: s.category,
                accuracy,
                total_attempts: s.total,
                priority,
                interval_index: advance_interval(s.interval_index, accuracy),
            }
        })
        .collect();

    queue.sort_by(|a, b| b.priority.partial_cmp(&a.priority).unwrap_or(Ordering::Equal));
    queue
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Mastery {
    /// 0..=5 bucket of the average accuracy.
    pub level: u8,
    /// Share of rated items at or above the strong threshold, 0..=100.
    pub percentage: f64,
}

/// Mastery over one category's items. Only items with enough attempts rate.
pub fn mastery(category_stats: &[ItemStat]) -> Mastery {
    let rated: Vec<&ItemStat> = category_stats
        .iter()
        .filter(|s| s.total >= MIN_RATED_ATTEMPTS)
        .collect();
    if rated.is_empty() {
        return Mastery {
            level: 0,
            percentage: 0.0,
        };
    }

    let avg: f64 = rated.iter().map(|s| s.accuracy()).sum::<f64>() / rated.len() as f64;
    let strong = rated
        .iter()
        .filter(|s| s.accuracy() >= STRONG_ACCURACY)
        .count();

    Mastery {
        level: ((avg * 5.0).floor() as u8).min(5),
        percentage: strong as f64 / rated.len() as f64 * 100.0,
    }
}

/// Rated items below the weak threshold, worst first.
pub fn weak_items(stats: &[ItemStat]) -> Vec<&ItemStat> {
    let mut weak: Vec<&ItemStat> = stats
        .iter()
        .filter(|s| s.total >= MIN_RATED_ATTEMPTS && s.accuracy() < WEAK_ACCURACY)
        .collect();
    weak.sort_by(|a, b| {
        a.accuracy()
            .partial_cmp(&b.accuracy())
            .unwrap_or(Ordering::Equal)
    });
    weak
}

/// Distinct categories containing weak items, worst mean accuracy first.
/// Feeds the recommender's improvement areas and the skill graph's
/// weak-category set.
pub fn improvement_areas(stats: &[ItemStat]) -> Vec<Category> {
    let mut buckets: Vec<(Category, f64, usize)> = Vec::new();
    for item in weak_items(stats) {
        match buckets.iter_mut().find(|(c, _, _)| *c == item.category) {
            Some((_, sum, n)) => {
                *sum += item.accuracy();
                *n += 1;
            }
            None => buckets.push((item.category, item.accuracy(), 1)),
        }
    }
    buckets.sort_by(|a, b| {
        let mean_a = a.1 / a.2 as f64;
        let mean_b = b.1 / b.2 as f64;
        mean_a.partial_cmp(&mean_b).unwrap_or(Ordering::Equal)
    });
    buckets.into_iter().map(|(c, _, _)| c).collect()
}

/// Attempt-weighted accuracy across all items, as a 0..=100 percentage.
pub fn overall_accuracy_pct(stats: &[ItemStat]) -> f64 {
    let total: u32 = stats.iter().map(|s| s.total).sum();
    if total == 0 {
        return 0.0;
    }
    let correct: u32 = stats.iter().map(|s| s.correct).sum();
    correct as f64 / total as f64 * 100.0
}
