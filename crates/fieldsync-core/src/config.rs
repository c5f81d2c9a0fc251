//! Configuration module for FieldSync.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, and defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration for FieldSync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Cache engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Key prefix for cache entries in the durable store.
    pub namespace: String,
    /// Default time-to-live for cache entries, in seconds. `None` means
    /// entries written without an explicit TTL never expire.
    pub default_ttl_secs: Option<u64>,
    /// Total cache budget in bytes. A write that would exceed it clears
    /// the cache namespace first. `0` disables the budget.
    pub max_size_bytes: u64,
    /// Path to the SQLite database backing the durable store.
    pub db_path: PathBuf,
}

/// Sync engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Key prefix for pending-change queue records.
    pub queue_namespace: String,
    /// Key prefix for sync bookkeeping (last sync time).
    pub meta_namespace: String,
    /// Whether the engine's run loop also syncs on a timer, in addition
    /// to connectivity-restore edges.
    pub auto_sync: bool,
    /// Seconds between periodic syncs when `auto_sync` is enabled.
    pub sync_interval_secs: u64,
}

/// Logging / tracing settings, consumed by the embedding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Optional path to a log file; `None` logs to stderr.
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/fieldsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("fieldsync")
            .join("config.yaml")
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: "fieldsync:cache:".to_string(),
            // 24 hours, matching the app's historical max entry age.
            default_ttl_secs: Some(24 * 60 * 60),
            max_size_bytes: 50 * 1024 * 1024,
            db_path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("fieldsync")
                .join("state.db"),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            queue_namespace: "fieldsync:queue:".to_string(),
            meta_namespace: "fieldsync:sync:".to_string(),
            auto_sync: true,
            sync_interval_secs: 5 * 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache.namespace, "fieldsync:cache:");
        assert_eq!(config.cache.default_ttl_secs, Some(86_400));
        assert_eq!(config.sync.queue_namespace, "fieldsync:queue:");
        assert!(config.sync.auto_sync);
        assert_eq!(config.sync.sync_interval_secs, 300);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_namespaces_are_disjoint() {
        let config = Config::default();
        assert!(!config.cache.namespace.starts_with(&config.sync.queue_namespace));
        assert!(!config.sync.queue_namespace.starts_with(&config.cache.namespace));
        assert!(!config.sync.meta_namespace.starts_with(&config.cache.namespace));
    }

    #[test]
    fn test_load_partial_yaml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "sync:\n  auto_sync: false\n  sync_interval_secs: 60\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(!config.sync.auto_sync);
        assert_eq!(config.sync.sync_interval_secs, 60);
        // Untouched sections keep their defaults.
        assert_eq!(config.cache.namespace, "fieldsync:cache:");
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(config.logging.level, "info");
    }
}
