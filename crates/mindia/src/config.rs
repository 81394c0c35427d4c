//! Configuration loading.
//!
//! Sources, lowest precedence first:
//! - Bundled defaults (`mindia.toml` compiled into the binary)
//! - `~/.config/mindia/mindia.toml`
//! - `./mindia.toml`, or an explicit file given on the command line
//! - `MINDIA_<SECTION>__<KEY>` environment variables

use config::{Config, Environment, File, FileFormat};
use mindia_error::{ConfigError, MindiaResult};
use mindia_scheduler::{ReplicateConfig, ReplicateConfigBuilder, SchedulerConfig, SchedulerConfigBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../mindia.toml");

/// Where originals, variants and records live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the original-bytes store
    pub file_dir: PathBuf,
    /// Root directory of the variant cache store
    pub cache_dir: PathBuf,
    /// JSON file holding named transformations
    pub named_transformations: PathBuf,
    /// JSON file holding media records
    pub media_records: PathBuf,
    /// JSON file holding the task queue and task records
    pub tasks: PathBuf,
}

/// Task scheduler cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Seconds between polls
    pub poll_interval_secs: u64,
    /// Most tasks taken per poll
    pub max_tasks_per_tick: usize,
}

impl SchedulerSettings {
    /// Settings as the scheduler expects them.
    pub fn to_scheduler_config(&self) -> MindiaResult<SchedulerConfig> {
        SchedulerConfigBuilder::default()
            .poll_interval(Duration::from_secs(self.poll_interval_secs.max(1)))
            .max_tasks_per_tick(self.max_tasks_per_tick.max(1))
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid scheduler settings: {}", e)).into())
    }
}

/// Storage-usage collector cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorSettings {
    /// Seconds between measurements
    pub interval_secs: u64,
}

impl CollectorSettings {
    /// Measurement period.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Colorize plugin settings. The API token is read from
/// `REPLICATE_API_TOKEN`, never from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorizeSettings {
    /// Whether the colorize plugin is registered
    pub enabled: bool,
    /// Prediction API root
    pub api_base_url: String,
    /// Model version hash
    pub model_version: String,
    /// Colorization model variant
    pub model_name: String,
    /// Render quality factor
    pub render_factor: u32,
    /// Public URL prefix under which originals are reachable
    pub public_base_url: String,
}

impl ColorizeSettings {
    /// Client settings with the given API token.
    pub fn to_replicate_config(&self, api_token: impl Into<String>) -> MindiaResult<ReplicateConfig> {
        ReplicateConfigBuilder::default()
            .api_base_url(self.api_base_url.clone())
            .api_token(api_token.into())
            .model_version(self.model_version.clone())
            .model_name(self.model_name.clone())
            .render_factor(self.render_factor)
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid colorize settings: {}", e)).into())
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

/// Complete Mindia configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindiaConfig {
    /// Store locations
    pub storage: StorageConfig,
    /// Task scheduler
    pub scheduler: SchedulerSettings,
    /// Storage-usage collector
    pub collector: CollectorSettings,
    /// Colorize plugin
    pub colorize: ColorizeSettings,
    /// Logging
    pub logging: LoggingSettings,
}

impl MindiaConfig {
    /// Load configuration with precedence: environment > explicit file or
    /// `./mindia.toml` > home dir > bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any source fails
    /// to parse.
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> MindiaResult<Self> {
        debug!("Loading configuration");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/mindia/mindia.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = match explicit {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("mindia").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("MINDIA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(builder)
    }

    /// Bundled defaults only.
    pub fn defaults() -> MindiaResult<Self> {
        Self::from_toml("")
    }

    /// Bundled defaults overlaid with `toml`.
    pub fn from_toml(toml: &str) -> MindiaResult<Self> {
        Self::finish(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> MindiaResult<Self> {
        builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_defaults_parse() {
        let config = MindiaConfig::defaults().unwrap();
        assert_eq!(config.scheduler.poll_interval_secs, 10);
        assert_eq!(config.scheduler.max_tasks_per_tick, 16);
        assert_eq!(config.collector.interval_secs, 5);
        assert_eq!(config.colorize.model_name, "Artistic");
        assert_eq!(config.colorize.render_factor, 35);
        assert!(!config.colorize.enabled);
    }

    #[test]
    fn overrides_merge_over_defaults() {
        let config = MindiaConfig::from_toml(
            "[scheduler]\npoll_interval_secs = 2\n[logging]\njson = true\n",
        )
        .unwrap();
        assert_eq!(config.scheduler.poll_interval_secs, 2);
        assert_eq!(config.scheduler.max_tasks_per_tick, 16);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn zero_intervals_are_clamped() {
        let settings = SchedulerSettings {
            poll_interval_secs: 0,
            max_tasks_per_tick: 0,
        };
        let config = settings.to_scheduler_config().unwrap();
        assert_eq!(*config.poll_interval(), Duration::from_secs(1));
        assert_eq!(*config.max_tasks_per_tick(), 1);
    }
}
