//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/sheetlink/config.toml)
//! 3. Environment variables (SHEETLINK_* prefix)
//!
//! Environment variables take precedence over config file values.
//!
//! ```toml
//! output_dir = "vault"
//! collection = "Book of Hours"
//!
//! [[tables]]
//! name = "Rooms"
//! path = "rooms.csv"
//!
//! [[tables]]
//! name = "Keywords"
//! kind = "expansion"
//! url = "https://example.com/export?format=csv&gid=1084909450"
//!
//! [[tables]]
//! name = "History"
//! kind = "ledger"
//! narrative_fields = ["Transcript"]
//! path = "history.csv"
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pipeline::{default_workers, PipelineOptions};
use crate::table::TableKind;

/// Environment variable prefix
const ENV_PREFIX: &str = "SHEETLINK";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory documents are written under
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Document file extension
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Category prefix for every table (e.g. the game or project name)
    #[serde(default)]
    pub collection: Option<String>,

    /// Worker threads (defaults to available parallelism)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Leave existing documents untouched instead of re-rendering them
    #[serde(default)]
    pub keep_existing: bool,

    /// Source tables
    #[serde(default)]
    pub tables: Vec<TableConfig>,

    /// Directory relative table paths are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Kind of a configured table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKindName {
    #[default]
    Standard,
    Expansion,
    Ledger,
}

/// One configured source table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name; becomes the category
    pub name: String,

    #[serde(default)]
    pub kind: TableKindName,

    /// Ledger fields holding free text (empty = all non-key fields)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub narrative_fields: Vec<String>,

    /// Local CSV file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Remote CSV export URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Where a table's CSV comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    Path(PathBuf),
    Url(String),
}

impl TableConfig {
    pub fn table_kind(&self) -> TableKind {
        match self.kind {
            TableKindName::Standard => TableKind::Standard,
            TableKindName::Expansion => TableKind::Expansion,
            TableKindName::Ledger => TableKind::Ledger {
                narrative_fields: self.narrative_fields.clone(),
            },
        }
    }

    /// The table's source, with relative paths resolved against `base_dir`
    pub fn source(&self, base_dir: Option<&Path>) -> Result<TableSource> {
        match (&self.path, &self.url) {
            (Some(path), None) => {
                let path = match base_dir {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path.clone(),
                };
                Ok(TableSource::Path(path))
            }
            (None, Some(url)) => Ok(TableSource::Url(url.clone())),
            (Some(_), Some(_)) => bail!("Table '{}' sets both path and url", self.name),
            (None, None) => bail!("Table '{}' has neither path nor url", self.name),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            extension: default_extension(),
            collection: None,
            workers: None,
            keep_existing: false,
            tables: Vec::new(),
            base_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (SHEETLINK_OUTPUT_DIR, SHEETLINK_WORKERS)
    /// 2. Config file (~/.config/sheetlink/config.toml or SHEETLINK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let mut config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.base_dir = path.parent().map(Path::to_path_buf);
            config
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `--config` when given, otherwise from the default location
    pub fn load_with_cli_override(config_path: Option<&PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // SHEETLINK_OUTPUT_DIR
        if let Ok(val) = std::env::var(format!("{}_OUTPUT_DIR", ENV_PREFIX)) {
            if !val.is_empty() {
                self.output_dir = PathBuf::from(val);
            }
        }

        // SHEETLINK_WORKERS
        if let Ok(val) = std::env::var(format!("{}_WORKERS", ENV_PREFIX)) {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => self.workers = Some(n),
                _ => tracing::warn!("Ignoring invalid {}_WORKERS value: {:?}", ENV_PREFIX, val),
            }
        }
    }

    /// Save configuration to file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Set a scalar configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output_dir" => self.output_dir = PathBuf::from(value),
            "extension" => {
                let ext = value.trim_start_matches('.');
                if ext.is_empty() {
                    bail!("extension cannot be empty");
                }
                self.extension = ext.to_string();
            }
            "collection" => {
                self.collection = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            "workers" => {
                let n: usize = value
                    .parse()
                    .with_context(|| format!("Invalid worker count: {}", value))?;
                self.workers = if n == 0 { None } else { Some(n) };
            }
            "keep_existing" => {
                self.keep_existing = value.eq_ignore_ascii_case("true") || value == "1"
            }
            _ => bail!(
                "Unknown config key: {}. Valid keys: output_dir, extension, collection, workers, keep_existing",
                key
            ),
        }
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with SHEETLINK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetlink")
            .join("config.toml")
    }

    /// Path of the catalog listing written after each build
    pub fn listing_path(&self) -> PathBuf {
        self.output_dir.join("link_references.txt")
    }

    /// Pipeline settings derived from this configuration
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            workers: self.workers.unwrap_or_else(default_workers),
            keep_existing: self.keep_existing,
            collection: self.collection.clone(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("vault")
}

fn default_extension() -> String {
    "md".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &["SHEETLINK_OUTPUT_DIR", "SHEETLINK_WORKERS", "SHEETLINK_CONFIG"];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output_dir, PathBuf::from("vault"));
        assert_eq!(config.extension, "md");
        assert!(config.tables.is_empty());
        assert!(!config.keep_existing);
    }

    #[test]
    fn test_load_from_str_tables() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            output_dir = "/custom/vault"
            collection = "Book of Hours"

            [[tables]]
            name = "Rooms"
            path = "rooms.csv"

            [[tables]]
            name = "Keywords"
            kind = "expansion"
            url = "https://example.com/export?format=csv&gid=1"

            [[tables]]
            name = "History"
            kind = "ledger"
            narrative_fields = ["Transcript"]
            path = "/data/history.csv"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/custom/vault"));
        assert_eq!(config.collection.as_deref(), Some("Book of Hours"));
        assert_eq!(config.tables.len(), 3);
        assert_eq!(config.tables[0].table_kind(), TableKind::Standard);
        assert_eq!(config.tables[1].table_kind(), TableKind::Expansion);
        assert_eq!(
            config.tables[2].table_kind(),
            TableKind::Ledger {
                narrative_fields: vec!["Transcript".to_string()]
            }
        );
    }

    #[test]
    fn test_table_source_resolution() {
        let relative = TableConfig {
            name: "Rooms".to_string(),
            kind: TableKindName::Standard,
            narrative_fields: Vec::new(),
            path: Some(PathBuf::from("rooms.csv")),
            url: None,
        };
        assert_eq!(
            relative.source(Some(Path::new("/etc/sheetlink"))).unwrap(),
            TableSource::Path(PathBuf::from("/etc/sheetlink/rooms.csv"))
        );

        let mut both = relative.clone();
        both.url = Some("https://example.com".to_string());
        assert!(both.source(None).is_err());

        let mut neither = relative;
        neither.path = None;
        assert!(neither.source(None).is_err());
    }

    #[test]
    fn test_env_override_output_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("SHEETLINK_OUTPUT_DIR", "/tmp/sheetlink-test");
        config.apply_env_overrides();

        assert_eq!(config.output_dir, PathBuf::from("/tmp/sheetlink-test"));
    }

    #[test]
    fn test_env_override_workers() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("SHEETLINK_WORKERS", "3");
        config.apply_env_overrides();
        assert_eq!(config.workers, Some(3));
        assert_eq!(config.pipeline_options().workers, 3);

        // Invalid values leave the configured count alone
        env::set_var("SHEETLINK_WORKERS", "zero");
        config.apply_env_overrides();
        assert_eq!(config.workers, Some(3));

        env::set_var("SHEETLINK_WORKERS", "0");
        config.apply_env_overrides();
        assert_eq!(config.workers, Some(3));
    }

    #[test]
    fn test_set_values() {
        let mut config = Config::default();
        config.set("extension", ".txt").unwrap();
        assert_eq!(config.extension, "txt");
        config.set("workers", "0").unwrap();
        assert_eq!(config.workers, None);
        config.set("keep_existing", "true").unwrap();
        assert!(config.keep_existing);
        config.set("collection", "").unwrap();
        assert!(config.collection.is_none());
        assert!(config.set("sync_url", "x").is_err());
        assert!(config.set("workers", "many").is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.collection = Some("Book of Hours".to_string());
        config.tables.push(TableConfig {
            name: "Rooms".to_string(),
            kind: TableKindName::Standard,
            narrative_fields: Vec::new(),
            path: Some(PathBuf::from("rooms.csv")),
            url: None,
        });
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.collection, config.collection);
        assert_eq!(loaded.tables, config.tables);
        assert_eq!(loaded.base_dir.as_deref(), Some(temp_dir.path()));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_path(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("vault"));
        assert!(config.base_dir.is_none());
    }
}
