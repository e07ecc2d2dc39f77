//! Resolver settings.
//!
//! Settings can be built in code, overlaid from environment variables, or
//! persisted as JSON through [`SettingsStore`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_CAPACITY: u64 = 1024;
/// Longest accepted cache TTL (one year). Larger values are clamped.
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Intent cache sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECS,
            max_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds.min(MAX_CACHE_TTL_SECS))
    }
}

/// Router tuning. Defaults bound the classifier prompt size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Night window is `[night_start_hour, night_end_hour)`.
    pub night_start_hour: u32,
    pub night_end_hour: u32,
    pub max_candidates_undetected: usize,
    pub max_candidates_single: usize,
    pub max_candidates_multiple: usize,
    pub category_bonus: i32,
    pub usage_bonus_cap: u64,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            night_start_hour: 0,
            night_end_hour: 5,
            max_candidates_undetected: 20,
            max_candidates_single: 12,
            max_candidates_multiple: 15,
            category_bonus: 50,
            usage_bonus_cap: 10,
        }
    }
}

/// Persisted resolver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    pub cache: CacheSettings,
    pub router: RouterSettings,
    /// Model label forwarded to the classifier. Empty means the classifier's default.
    pub classifier_model: String,
    /// Literal phrases answered without consulting the classifier.
    pub special_commands: Vec<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            cache: CacheSettings::default(),
            router: RouterSettings::default(),
            classifier_model: String::new(),
            special_commands: vec![
                "功能列表".to_string(),
                "有什麼功能".to_string(),
                "能做什麼".to_string(),
            ],
        }
    }
}

impl ResolverSettings {
    /// Defaults overlaid with `ASSISTANT_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `ASSISTANT_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        const TTL_KEY: &str = "ASSISTANT_INTENT_CACHE_TTL_SECS";
        if let Some(ttl) = parse_u64(TTL_KEY, lookup(TTL_KEY)) {
            if ttl > MAX_CACHE_TTL_SECS {
                tracing::warn!(
                    key = TTL_KEY,
                    value = ttl,
                    max = MAX_CACHE_TTL_SECS,
                    "cache ttl too large; clamping"
                );
            }
            self.cache.ttl_seconds = ttl.min(MAX_CACHE_TTL_SECS);
        }
        const CAPACITY_KEY: &str = "ASSISTANT_INTENT_CACHE_CAPACITY";
        if let Some(capacity) = parse_u64(CAPACITY_KEY, lookup(CAPACITY_KEY)) {
            self.cache.max_capacity = capacity;
        }
        if let Some(model) = lookup("ASSISTANT_CLASSIFIER_MODEL") {
            if !model.is_empty() {
                self.classifier_model = model;
            }
        }
        self
    }

    pub fn model(&self) -> Option<String> {
        if self.classifier_model.is_empty() {
            None
        } else {
            Some(self.classifier_model.clone())
        }
    }
}

fn parse_u64(key: &str, raw: Option<String>) -> Option<u64> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring non-numeric environment override");
            None
        }
    }
}

/// Reads and writes [`ResolverSettings`] as pretty JSON.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `ASSISTANT_SETTINGS_PATH`, falling back to the platform data directory.
    pub fn default_location() -> Self {
        let path = std::env::var("ASSISTANT_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("assistant-core")
                    .join("resolver_settings.json")
            });
        Self::new(path)
    }

    /// Loads settings, returning defaults if the file does not exist.
    pub fn load(&self) -> Result<ResolverSettings, SettingsError> {
        if !self.path.exists() {
            return Ok(ResolverSettings::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|error| SettingsError::Parse {
            path: self.path.clone(),
            message: error.to_string(),
        })
    }

    pub fn save(&self, settings: &ResolverSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(settings)
            .map_err(|error| SettingsError::Serialization(error.to_string()))?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
