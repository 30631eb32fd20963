use serde::{Deserialize, Serialize};

use crate::engine::analytics::CachedAnalytics;
use crate::engine::item_stats::ItemStatsStore;
use crate::engine::skill_graph::LearningPath;
use crate::session::history::SessionHistory;
use crate::session::profile::PracticeProfile;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemStatsData {
    pub schema_version: u32,
    pub stats: ItemStatsStore,
}

impl Default for ItemStatsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stats: ItemStatsStore::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionHistoryData {
    pub schema_version: u32,
    pub history: SessionHistory,
}

impl Default for SessionHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            history: SessionHistory::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileData {
    pub schema_version: u32,
    pub profile: PracticeProfile,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            profile: PracticeProfile::default(),
        }
    }
}

/// No Default: a missing or schema-mismatched path is regenerated by the
/// engine rather than zero-filled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearningPathData {
    pub schema_version: u32,
    pub path: LearningPath,
}

impl LearningPathData {
    pub fn new(path: LearningPath) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            path,
        }
    }

    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyticsCacheData {
    pub schema_version: u32,
    pub cache: CachedAnalytics,
}

impl AnalyticsCacheData {
    pub fn new(cache: CachedAnalytics) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            cache,
        }
    }

    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
