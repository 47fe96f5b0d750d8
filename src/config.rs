use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use equivalence::{Comparator, DEFAULT_IGNORE_KEYS, ListMatching, NumberMode, Options, one_or_many};
use naming::{DEFAULT_MAX_ATTEMPTS, NameAllocator, default_replace, resource_name};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "confport.toml";

/// Get the user config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("confport"))
}

/// How repeated names are disambiguated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    /// `Name(1)`
    Paren,
    /// `Name_1`, valid as a block identifier
    #[default]
    Underscore,
}

// ============================================================================
// Config Schema
// ============================================================================

/// Effective confport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keys never compared during reconciliation (a string or a list).
    /// `metricExpressions` is always ignored in addition to these.
    #[serde(deserialize_with = "one_or_many")]
    pub ignore_keys: Vec<String>,

    /// Numeric comparison mode
    pub numbers: NumberMode,

    /// List matching strategy
    pub lists: ListMatching,

    /// Disambiguation style for exported names
    pub name_style: NameStyle,

    /// Turn display names into valid identifiers before export allocation
    pub sanitize: bool,

    /// Upper bound for the disambiguation loop
    pub max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_keys: DEFAULT_IGNORE_KEYS.iter().map(ToString::to_string).collect(),
            numbers: NumberMode::default(),
            lists: ListMatching::default(),
            name_style: NameStyle::default(),
            sanitize: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    /// Load the config.
    ///
    /// An explicit path must exist. Otherwise `./confport.toml` is tried,
    /// then `~/.config/confport/config.toml`, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match Self::locate(explicit)? {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::load_file(&path)?
            }
            None => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML format in confport config")
    }

    /// Serialize the config as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if let Some(key) = self.ignore_keys.iter().find(|k| k.trim().is_empty()) {
            bail!("ignore_keys contains an empty key: {key:?}");
        }
        Ok(())
    }

    /// Comparator configured from this config
    pub fn comparator(&self) -> Comparator {
        Comparator::new(Options {
            ignore_keys: DEFAULT_IGNORE_KEYS
                .iter()
                .map(ToString::to_string)
                .chain(self.ignore_keys.iter().cloned())
                .collect(),
            numbers: self.numbers,
            lists: self.lists,
        })
    }

    /// Fresh name allocator configured from this config
    pub fn allocator(&self) -> NameAllocator {
        let allocator = NameAllocator::new().with_max_attempts(self.max_attempts);
        match self.name_style {
            NameStyle::Paren => allocator.with_replace(default_replace),
            NameStyle::Underscore => allocator.with_replace(resource_name),
        }
    }

    /// Path of the config file [`load`](Self::load) would read, if any
    pub fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            return Ok(Some(path.to_path_buf()));
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Ok(Some(local));
        }

        let user = config_dir()?.join("config.toml");
        if user.exists() {
            return Ok(Some(user));
        }

        Ok(None)
    }
}
