//! Configuration for the uplevel core.
//!
//! Loads `~/.uplevel/config.toml` when present, with `UPLEVEL_*` environment
//! variables taking precedence over file values and built-in defaults
//! covering the rest.
//!
//! ```toml
//! # ~/.uplevel/config.toml
//!
//! [cache]
//! backend = "memory"              # or "remote"
//! url = "http://cache.internal:7700"
//! default_ttl_secs = 3600
//! sweep_interval_secs = 60
//!
//! [queue]
//! backend = "local"               # or "remote"
//! url = "http://queue.internal:7701"
//!
//! [engine]
//! peer_alpha = 0.2
//! per_skill_cap = 5
//! suggestion_limit = 10
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use uplevel_engine::EngineConfig;

pub const DEFAULT_TTL_SECS: u64 = 3600;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Which implementation backs the cache layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Remote,
}

/// Which implementation backs the job trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackend {
    #[default]
    Local,
    Remote,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub engine: EngineSettings,
}

/// Cache layer configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    /// Base URL of the networked store; required when `backend = "remote"`.
    pub url: Option<String>,
    pub default_ttl_secs: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs.unwrap_or(DEFAULT_TTL_SECS))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(
            self.sweep_interval_secs
                .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
        )
    }
}

/// Job trigger configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueConfig {
    #[serde(default)]
    pub backend: QueueBackend,
    /// Base URL of the external queue; required when `backend = "remote"`.
    pub url: Option<String>,
}

/// Engine tunables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineSettings {
    pub peer_alpha: Option<f64>,
    pub per_skill_cap: Option<usize>,
    pub suggestion_limit: Option<usize>,
}

/// Returns the path to the config file (`~/.uplevel/config.toml`), unless
/// `UPLEVEL_CONFIG` points elsewhere.
fn config_path() -> Option<PathBuf> {
    if let Ok(custom) = std::env::var("UPLEVEL_CONFIG") {
        return Some(PathBuf::from(custom));
    }
    dirs::home_dir().map(|h| h.join(".uplevel").join("config.toml"))
}

impl Config {
    /// Load configuration: file when present, then environment overrides,
    /// then validation.
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let parsed: Config = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", path.display()))?;
                tracing::debug!(
                    target: "uplevel::config",
                    path = %path.display(),
                    "loaded configuration file"
                );
                parsed
            }
            _ => Config::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `UPLEVEL_*` environment variables on top of file values.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var("UPLEVEL_CACHE_BACKEND") {
            self.cache.backend = match raw.to_ascii_lowercase().as_str() {
                "memory" => CacheBackend::Memory,
                "remote" => CacheBackend::Remote,
                other => bail!("unknown cache backend: {other}"),
            };
        }
        if let Ok(url) = std::env::var("UPLEVEL_CACHE_URL") {
            self.cache.url = Some(url);
        }
        if let Ok(raw) = std::env::var("UPLEVEL_CACHE_TTL_SECS") {
            self.cache.default_ttl_secs =
                Some(raw.parse().context("parsing UPLEVEL_CACHE_TTL_SECS")?);
        }
        if let Ok(raw) = std::env::var("UPLEVEL_SWEEP_INTERVAL_SECS") {
            self.cache.sweep_interval_secs =
                Some(raw.parse().context("parsing UPLEVEL_SWEEP_INTERVAL_SECS")?);
        }
        if let Ok(raw) = std::env::var("UPLEVEL_QUEUE_BACKEND") {
            self.queue.backend = match raw.to_ascii_lowercase().as_str() {
                "local" => QueueBackend::Local,
                "remote" => QueueBackend::Remote,
                other => bail!("unknown queue backend: {other}"),
            };
        }
        if let Ok(url) = std::env::var("UPLEVEL_QUEUE_URL") {
            self.queue.url = Some(url);
        }
        if let Ok(raw) = std::env::var("UPLEVEL_PEER_ALPHA") {
            self.engine.peer_alpha = Some(raw.parse().context("parsing UPLEVEL_PEER_ALPHA")?);
        }
        if let Ok(raw) = std::env::var("UPLEVEL_PER_SKILL_CAP") {
            self.engine.per_skill_cap =
                Some(raw.parse().context("parsing UPLEVEL_PER_SKILL_CAP")?);
        }
        if let Ok(raw) = std::env::var("UPLEVEL_SUGGESTION_LIMIT") {
            self.engine.suggestion_limit =
                Some(raw.parse().context("parsing UPLEVEL_SUGGESTION_LIMIT")?);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.cache.backend == CacheBackend::Remote && self.cache.url.is_none() {
            bail!("cache backend is remote but no cache url is configured");
        }
        if self.queue.backend == QueueBackend::Remote && self.queue.url.is_none() {
            bail!("queue backend is remote but no queue url is configured");
        }
        if let Some(alpha) = self.engine.peer_alpha {
            if !(0.0..=1.0).contains(&alpha) {
                bail!("peer_alpha must be within [0, 1], got {alpha}");
            }
        }
        Ok(())
    }

    /// Engine configuration with defaults filled in.
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            peer_alpha: self.engine.peer_alpha.unwrap_or(defaults.peer_alpha),
            per_skill_cap: self.engine.per_skill_cap.unwrap_or(defaults.per_skill_cap),
            limit: self.engine.suggestion_limit.unwrap_or(defaults.limit),
        }
    }
}
