//! Configuration loading and root folder resolution
//!
//! Root folder resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`IMDB_ETL_ROOT_FOLDER`, then `IMDB_ETL_ROOT`)
//! 3. TOML config file (`root_folder`)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or malformed TOML file never terminates the program: a warning is
//! logged and compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Primary root folder environment variable
pub const ENV_ROOT_FOLDER: &str = "IMDB_ETL_ROOT_FOLDER";

/// Alternative root folder environment variable
pub const ENV_ROOT: &str = "IMDB_ETL_ROOT";

/// Folder (under the root) holding downloaded source files
pub const RAW_FOLDER_NAME: &str = "Raw";

/// Folder (under the root) holding produced artifacts
pub const RESULT_FOLDER_NAME: &str = "Result_ETL";

const DEFAULT_BASICS_URL: &str = "https://datasets.imdbws.com/title.basics.tsv.gz";
const DEFAULT_RATINGS_URL: &str = "https://datasets.imdbws.com/title.ratings.tsv.gz";

/// TOML configuration file contents
///
/// Every field is optional; absent sections fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder containing `Raw/` and `Result_ETL/`
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dataset download locations
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Ranking policy selection
    #[serde(default)]
    pub ranking: RankingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Remote locations of the two IMDB dumps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_basics_url")]
    pub basics_url: String,

    #[serde(default = "default_ratings_url")]
    pub ratings_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            basics_url: default_basics_url(),
            ratings_url: default_ratings_url(),
        }
    }
}

/// Ranking policy names, validated by the consuming crate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Final ascending order of a top-percent slice: `rating` or `original_title`
    #[serde(default = "default_sort_key")]
    pub sort_key: String,

    /// Boundary tie-break: `input_order` or `num_votes`
    #[serde(default = "default_tie_break")]
    pub tie_break: String,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            sort_key: default_sort_key(),
            tie_break: default_tie_break(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_basics_url() -> String {
    DEFAULT_BASICS_URL.to_string()
}

fn default_ratings_url() -> String {
    DEFAULT_RATINGS_URL.to_string()
}

fn default_sort_key() -> String {
    "rating".to_string()
}

fn default_tie_break() -> String {
    "input_order".to_string()
}

/// Compiled-in defaults used when nothing else is configured
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was built for
    ///
    /// - Linux: `~/.local/share/imdb-etl`
    /// - macOS: `~/Library/Application Support/imdb-etl`
    /// - Windows: `%LOCALAPPDATA%\imdb-etl`
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("imdb-etl"))
            .unwrap_or_else(|| PathBuf::from("./imdb_etl_data"));

        Self { root_folder }
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Resolves the root folder and config file for a module
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            config_path: None,
        }
    }

    /// Highest-priority override from the command line
    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    /// Use an explicit config file instead of the per-user default
    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    /// Config file location: explicit path, else `<config dir>/imdb-etl/<module>.toml`
    pub fn config_file_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            return Some(path.clone());
        }
        dirs::config_dir().map(|d| {
            d.join("imdb-etl")
                .join(format!("{}.toml", self.module_name))
        })
    }

    /// Load the TOML config, degrading to defaults on any failure
    pub fn load_config(&self) -> TomlConfig {
        let Some(path) = self.config_file_path() else {
            warn!("Could not determine config directory, using defaults");
            return TomlConfig::default();
        };

        match load_toml_config(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(Error::NotFound(_)) => {
                debug!("No config file at {}, using defaults", path.display());
                TomlConfig::default()
            }
            Err(e) => {
                warn!("{} ({}), using defaults", e, path.display());
                TomlConfig::default()
            }
        }
    }

    /// Resolve the root folder following the priority order, with `config`
    /// as the already loaded TOML file
    pub fn resolve_with_config(&self, config: &TomlConfig) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ENV_ROOT_FOLDER) {
            return PathBuf::from(path);
        }

        if let Ok(path) = std::env::var(ENV_ROOT) {
            return PathBuf::from(path);
        }

        if let Some(root_folder) = &config.root_folder {
            return root_folder.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and its working folders
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Folder for downloaded and decompressed source files
    pub fn raw_folder(&self) -> PathBuf {
        self.root_folder.join(RAW_FOLDER_NAME)
    }

    /// Folder for produced artifacts
    pub fn result_folder(&self) -> PathBuf {
        self.root_folder.join(RESULT_FOLDER_NAME)
    }

    /// Create root, raw, and result folders; safe to call repeatedly
    pub fn ensure_working_folders(&self) -> Result<()> {
        ensure_dir(&self.root_folder)?;
        ensure_dir(&self.raw_folder())?;
        ensure_dir(&self.result_folder())
    }
}

/// Create a directory and its parents unless it already exists
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path)?;
    debug!("Created directory {}", path.display());
    Ok(())
}
