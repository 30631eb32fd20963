use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::item_stats::{Category, DEFAULT_CATEGORY};
use crate::engine::recommend::LongSessionPolicy;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default = "default_long_session_policy")]
    pub long_session_policy: String,
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_key().to_string()
}
fn default_long_session_policy() -> String {
    "random".to_string()
}
fn default_cache_ttl_minutes() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            long_session_policy: default_long_session_policy(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("etude")
            .join("config.toml")
    }

    pub fn category(&self) -> Category {
        Category::from_key(&self.default_category).unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn policy(&self) -> LongSessionPolicy {
        match self.long_session_policy.as_str() {
            "challenge" => LongSessionPolicy::PreferChallenge,
            "review" => LongSessionPolicy::PreferReview,
            _ => LongSessionPolicy::Random,
        }
    }

    /// Reset unknown keys to defaults. Call after deserialization to handle
    /// stale values from old config files.
    pub fn normalize(&mut self) {
        if Category::from_key(&self.default_category).is_none() {
            self.default_category = default_category();
        }
        if !matches!(
            self.long_session_policy.as_str(),
            "random" | "challenge" | "review"
        ) {
            self.long_session_policy = default_long_session_policy();
        }
    }
}
