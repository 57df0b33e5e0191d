//! Configuration loading and data folder resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "TB_CONFIG";
/// Environment variable overriding the artifact folder
pub const DATA_DIR_ENV: &str = "TB_DATA_DIR";
/// Environment variable overriding the product catalog path
pub const CATALOG_ENV: &str = "TB_CATALOG";
/// Environment variable carrying the Spoonacular API key
pub const SPOONACULAR_KEY_ENV: &str = "TB_SPOONACULAR_API_KEY";
/// Environment variable carrying the Brave Search API key
pub const BRAVE_KEY_ENV: &str = "TB_BRAVE_API_KEY";

/// On-disk shape of the resolution and matching artifacts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactLayout {
    /// `recipe_data.json` + `recipe_product_data.json`
    #[default]
    Combined,
    /// `recipe_ingredients.json` + `recipe_product_ingredients.json`
    TwoStage,
}

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for the TrendBasket crates when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: CompiledDefaults::for_current_platform().log_level,
        }
    }
}

/// Trend discovery parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendsConfig {
    /// Keyword whose rising related queries are collected
    pub seed_keyword: String,
    /// Google Trends timeframe expression
    pub timeframe: String,
    /// Geographic region code
    pub region: String,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            seed_keyword: "recipe".to_string(),
            timeframe: "now 7-d".to_string(),
            region: "US".to_string(),
        }
    }
}

/// TOML configuration file contents
///
/// Every field is optional; a missing file is equivalent to an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub data_dir: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub artifact_layout: ArtifactLayout,
    pub min_match_score: Option<f64>,
    pub rate_limit_ms: Option<u64>,
    pub spoonacular_api_key: Option<String>,
    pub brave_api_key: Option<String>,
    pub trends: TrendsConfig,
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Minimum similarity for a match to join a recipe's product set
    pub fn min_match_score(&self) -> f64 {
        self.min_match_score
            .unwrap_or(CompiledDefaults::for_current_platform().min_match_score)
    }

    /// Spacing between external calls, in milliseconds
    pub fn rate_limit_ms(&self) -> u64 {
        self.rate_limit_ms
            .unwrap_or(CompiledDefaults::for_current_platform().rate_limit_ms)
    }
}

/// Compiled fallbacks used when nothing else configures a setting
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub rate_limit_ms: u64,
    pub min_match_score: f64,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            // Artifacts land next to where the tool is started
            data_dir: PathBuf::from("."),
            log_level: "info".to_string(),
            rate_limit_ms: 1000,
            min_match_score: 0.6,
        }
    }
}

/// Platform config file location: `<config_dir>/trendbasket/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("trendbasket").join("config.toml"))
}

/// Locate the config file: CLI → `TB_CONFIG` → platform default
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// Load the TOML config file
///
/// A missing file is not an error: a warning is logged and defaults are
/// returned. A file that exists but fails to parse is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    if let Some(score) = config.min_match_score {
        if !(0.0..=1.0).contains(&score) {
            return Err(Error::Config(format!(
                "min_match_score must be within [0, 1], got {}",
                score
            )));
        }
    }

    info!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Locate and load the config file
///
/// A file named on the command line or in `TB_CONFIG` must exist; a missing
/// platform-default file just means defaults.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let explicit = cli_arg.is_some()
        || std::env::var(CONFIG_PATH_ENV)
            .map(|p| !p.trim().is_empty())
            .unwrap_or(false);

    let Some(path) = resolve_config_path(cli_arg) else {
        return Ok(TomlConfig::default());
    };

    if explicit && !path.exists() {
        return Err(Error::NotFound(format!("config file {}", path.display())));
    }

    load_toml_config(&path)
}

/// Resolves a folder setting through CLI → ENV → TOML → default
pub struct DataFolderResolver {
    env_var_name: &'static str,
}

impl DataFolderResolver {
    pub fn new(env_var_name: &'static str) -> Self {
        Self { env_var_name }
    }

    /// Resolve the artifact folder
    pub fn resolve(&self, cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(self.env_var_name) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &toml_config.data_dir {
            return path.clone();
        }

        // Priority 4: Compiled default
        CompiledDefaults::for_current_platform().data_dir
    }

    /// Create the folder if it does not exist yet
    pub fn ensure_directory_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::create_dir_all(path)?;
            info!(path = %path.display(), "Created data folder");
        }
        Ok(())
    }
}

/// Resolve the optional catalog path: CLI → `TB_CATALOG` → TOML
pub fn resolve_catalog_path(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CATALOG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    toml_config.catalog_path.clone()
}

/// Resolve an API key from ENV → TOML
///
/// `service` names the key in log lines and in the error returned when
/// neither source holds a valid key.
pub fn resolve_api_key(
    service: &str,
    env_var_name: &str,
    toml_value: Option<&String>,
) -> Result<String> {
    let env_key = std::env::var(env_var_name).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_value.filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in environment and TOML config. Using environment (higher priority).",
            service
        );
    }

    if let Some(key) = env_key {
        info!("{} API key loaded from environment variable", service);
        return Ok(key);
    }

    if let Some(key) = toml_key {
        info!("{} API key loaded from TOML config", service);
        return Ok(key.clone());
    }

    Err(Error::Config(format!(
        "{service} API key not configured. Please configure using one of:\n\
         1. Environment: {env_var_name}=your-key-here\n\
         2. TOML config: {} ({} = \"your-key\")",
        default_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "config.toml".to_string()),
        env_var_name.trim_start_matches("TB_").to_lowercase(),
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
