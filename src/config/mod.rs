//! Configuration layer: typed settings with layered precedence (file -> env).

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::repos::StorageScope;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const ENV_PREFIX: &str = "FOGLIO";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_RELATED_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration could not be loaded: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub site: SiteSettings,
    pub related: RelatedSettings,
    pub comments: CommentSettings,
}

impl Settings {
    /// Load settings from the optional `config/default` file, then apply
    /// `FOGLIO_`-prefixed environment overrides (`__` separates levels,
    /// e.g. `FOGLIO_RELATED__TAG_WEIGHT=3`).
    pub fn load() -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/foglio".to_string(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Timezone used to bucket publish timestamps into month/year.
    pub timezone: Tz,
    /// Frontend storage locations; empty means unrestricted.
    pub storage_pages: Vec<i64>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            storage_pages: Vec::new(),
        }
    }
}

impl SiteSettings {
    pub fn storage_scope(&self) -> StorageScope {
        if self.storage_pages.is_empty() {
            StorageScope::Unrestricted
        } else {
            StorageScope::Pages(self.storage_pages.clone())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelatedSettings {
    pub category_weight: u32,
    pub tag_weight: u32,
    pub limit: usize,
}

impl Default for RelatedSettings {
    fn default() -> Self {
        Self {
            category_weight: 1,
            tag_weight: 1,
            limit: DEFAULT_RELATED_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommentSettings {
    /// Hold every accepted comment for review instead of publishing it.
    pub require_moderation: bool,
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            require_moderation: true,
        }
    }
}
