use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spaced-repetition resurfacing ladder, in days.
pub const INTERVAL_LADDER_DAYS: [u32; 7] = [1, 2, 4, 7, 14, 30, 60];

/// Accuracy at or above which an item is considered solid.
pub const STRONG_ACCURACY: f64 = 0.85;
/// Accuracy below which an item is considered weak.
pub const WEAK_ACCURACY: f64 = 0.6;

// --- Category ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Notes,
    Intervals,
    Chords,
    Scales,
    Rhythm,
}

impl Category {
    pub fn to_key(self) -> &'static str {
        match self {
            Category::Notes => "notes",
            Category::Intervals => "intervals",
            Category::Chords => "chords",
            Category::Scales => "scales",
            Category::Rhythm => "rhythm",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "notes" => Some(Category::Notes),
            "intervals" => Some(Category::Intervals),
            "chords" => Some(Category::Chords),
            "scales" => Some(Category::Scales),
            "rhythm" => Some(Category::Rhythm),
            _ => None,
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Category::Notes,
            Category::Intervals,
            Category::Chords,
            Category::Scales,
            Category::Rhythm,
        ]
    }
}

pub const DEFAULT_CATEGORY: Category = Category::Notes;

/// Fixed line-up for challenge sessions.
pub const CHALLENGE_CATEGORIES: [Category; 4] = [
    Category::Notes,
    Category::Intervals,
    Category::Chords,
    Category::Scales,
];

// --- ItemStat ---

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemStat {
    pub item_id: String,
    pub category: Category,
    pub correct: u32,
    pub total: u32,
    pub last_practiced: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interval_index: usize,
}

impl ItemStat {
    pub fn new(item_id: impl Into<String>, category: Category) -> Self {
        Self {
            item_id: item_id.into(),
            category,
            correct: 0,
            total: 0,
            last_practiced: None,
            interval_index: 0,
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Move an item's ladder position after a practice round: solid accuracy
/// climbs one rung (capped at the top), weak accuracy falls back to the
/// bottom, anything in between stays put.
pub fn advance_interval(index: usize, accuracy: f64) -> usize {
    if accuracy >= STRONG_ACCURACY {
        (index + 1).min(INTERVAL_LADDER_DAYS.len() - 1)
    } else if accuracy < WEAK_ACCURACY {
        0
    } else {
        index
    }
}

// --- ItemStatsStore ---

/// Per-item accuracy aggregates. Items accumulate forever and are never
/// deleted; insertion order is preserved so downstream sorts stay stable.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemStatsStore {
    pub items: Vec<ItemStat>,
}

impl ItemStatsStore {
    pub fn get(&self, item_id: &str) -> Option<&ItemStat> {
        self.items.iter().find(|s| s.item_id == item_id)
    }

    /// Fold one practice round into the item's aggregate and advance its
    /// ladder position from the updated accuracy.
    pub fn record_result(
        &mut self,
        item_id: &str,
        category: Category,
        correct: u32,
        attempts: u32,
        now: DateTime<Utc>,
    ) {
        let idx = match self.items.iter().position(|s| s.item_id == item_id) {
            Some(idx) => idx,
            None => {
                self.items.push(ItemStat::new(item_id, category));
                self.items.len() - 1
            }
        };
        let stat = &mut self.items[idx];
        stat.correct += correct;
        stat.total += attempts;
        stat.last_practiced = Some(now);
        stat.interval_index = advance_interval(stat.interval_index, stat.accuracy());
    }
}
