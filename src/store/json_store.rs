use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::engine::analytics::{AnalyticsReport, CachedAnalytics};
use crate::engine::item_stats::ItemStatsStore;
use crate::engine::skill_graph::LearningPath;
use crate::session::history::SessionHistory;
use crate::session::profile::PracticeProfile;
use crate::session::record::PracticeSession;
use crate::store::schema::{
    AnalyticsCacheData, ItemStatsData, LearningPathData, ProfileData, SessionHistoryData,
};

/// Per-user JSON persistence for the engine's collaborator contracts.
/// Loads tolerate missing or corrupt files; saves are atomic
/// (write-to-tmp, fsync, rename).
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("etude");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, user_id: &str, name: &str) -> PathBuf {
        self.base_dir.join(format!("{user_id}_{name}"))
    }

    fn load<T: DeserializeOwned + Default>(&self, user_id: &str, name: &str) -> T {
        let path = self.file_path(user_id, name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    /// Load without a default: None when the file is missing or cannot be
    /// parsed (schema mismatch / corruption).
    fn load_opt<T: DeserializeOwned>(&self, user_id: &str, name: &str) -> Option<T> {
        let path = self.file_path(user_id, name);
        if !path.exists() {
            return None;
        }
        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn save<T: Serialize>(&self, user_id: &str, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(user_id, name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    // --- Item stats ---

    pub fn load_item_stats(&self, user_id: &str) -> ItemStatsStore {
        self.load::<ItemStatsData>(user_id, "item_stats.json").stats
    }

    pub fn save_item_stats(&self, user_id: &str, stats: &ItemStatsStore) -> Result<()> {
        let data = ItemStatsData {
            stats: stats.clone(),
            ..ItemStatsData::default()
        };
        self.save(user_id, "item_stats.json", &data)
    }

    // --- Session log ---

    pub fn load_sessions(&self, user_id: &str) -> SessionHistory {
        self.load::<SessionHistoryData>(user_id, "sessions.json")
            .history
    }

    /// Append one session to the capped log. Re-running a failed append is
    /// safe: the log is rewritten whole each time.
    pub fn append_session(&self, user_id: &str, session: PracticeSession) -> Result<()> {
        let mut history = self.load_sessions(user_id);
        history.push(session);
        let data = SessionHistoryData {
            history,
            ..SessionHistoryData::default()
        };
        self.save(user_id, "sessions.json", &data)
    }

    // --- Learning path ---

    pub fn load_learning_path(&self, user_id: &str) -> Option<LearningPath> {
        let data: LearningPathData = self.load_opt(user_id, "learning_path.json")?;
        if data.needs_reset() {
            return None;
        }
        Some(data.path)
    }

    pub fn save_learning_path(&self, user_id: &str, path: &LearningPath) -> Result<()> {
        self.save(
            user_id,
            "learning_path.json",
            &LearningPathData::new(path.clone()),
        )
    }

    // --- Analytics cache ---

    pub fn load_cached_analytics(&self, user_id: &str) -> Option<CachedAnalytics> {
        let data: AnalyticsCacheData = self.load_opt(user_id, "analytics.json")?;
        if data.needs_reset() {
            return None;
        }
        Some(data.cache)
    }

    pub fn save_cached_analytics(
        &self,
        user_id: &str,
        report: &AnalyticsReport,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let cache = CachedAnalytics {
            report: report.clone(),
            cached_at: now,
        };
        self.save(user_id, "analytics.json", &AnalyticsCacheData::new(cache))
    }

    // --- Profile ---

    pub fn load_profile(&self, user_id: &str) -> PracticeProfile {
        self.load::<ProfileData>(user_id, "profile.json").profile
    }

    pub fn save_profile(&self, user_id: &str, profile: &PracticeProfile) -> Result<()> {
        let data = ProfileData {
            profile: profile.clone(),
            ..ProfileData::default()
        };
        self.save(user_id, "profile.json", &data)
    }
}
