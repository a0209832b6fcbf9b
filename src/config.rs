use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::api::DEFAULT_BASE_URL;
use crate::tmdb::DEFAULT_IMAGE_BASE_URL;

pub const DEFAULT_SAMPLE_URL: &str = "https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config directory not found")]
    NoConfigDir,
    #[error("config file not found at {0}")]
    NotFound(PathBuf),
    #[error("failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("validation failed: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbConfig {
    pub apikey: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            apikey: None,
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_image_base_url() -> String {
    DEFAULT_IMAGE_BASE_URL.to_string()
}

/// How the initial load treats a category that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationPolicy {
    /// Any failed category fails the whole load
    #[default]
    AllOrNothing,
    /// Show whatever succeeded; fail only when nothing did
    Partial,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub aggregation: AggregationPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_sample_url")]
    pub sample_url: String,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    #[serde(default = "default_controls_hide_delay_ms")]
    pub controls_hide_delay_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sample_url: default_sample_url(),
            progress_interval_ms: default_progress_interval_ms(),
            controls_hide_delay_ms: default_controls_hide_delay_ms(),
        }
    }
}

fn default_sample_url() -> String {
    DEFAULT_SAMPLE_URL.to_string()
}

fn default_progress_interval_ms() -> u64 {
    500
}

fn default_controls_hide_delay_ms() -> u64 {
    3000
}

impl PlayerConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn controls_hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_delay_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("", "", "marquee")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("tmdb.base_url", &self.tmdb.base_url),
            ("tmdb.image_base_url", &self.tmdb.image_base_url),
        ] {
            if value.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} cannot be empty",
                    name
                )));
            }
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "{} must start with http:// or https://",
                    name
                )));
            }
        }

        if Url::parse(&self.player.sample_url).is_err() {
            return Err(ConfigError::ValidationError(
                "player.sample_url is not a valid URL".to_string(),
            ));
        }

        if self.player.progress_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "player.progress_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
