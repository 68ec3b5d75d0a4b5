//! Configuration for the unification engine.
//!
//! Limits and CSV policy are carried in an explicit [`Config`] value that is
//! passed to every entry point; the library never reads the process
//! environment. The binary loads it from TOML and overrides it from the
//! command line.
//!
//! # Example
//!
//! ```
//! use unifio::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.depth_cap, 10);
//! assert_eq!(config.array_cap, 1000);
//!
//! let strict = Config {
//!     array_cap: 50,
//!     ..Config::default()
//! };
//! assert_eq!(strict.array_cap, 50);
//! ```

use crate::converters::CellSanitizer;
use crate::policy::encoding::DEFAULT_THRESHOLD;
use crate::policy::sanitize::neutralize_formula;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for parsing, merging and projection.
///
/// # Fields
///
/// * `depth_cap` - Deepest template level the projection walks (default: 10)
/// * `array_cap` - Most matches a single template leaf returns (default: 1000)
/// * `sanitize_csv` - Neutralize spreadsheet formulas in CSV cells (default: true)
/// * `nonprintable_threshold` - Control-character ratio at which input counts as binary (default: 0.05)
/// * `csv_cell_sanitizer` - Explicit cell hook; takes precedence over `sanitize_csv`
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Deepest template level the projection walks
    #[serde(default = "default_depth_cap")]
    pub depth_cap: usize,

    /// Most matches a single template leaf returns
    #[serde(default = "default_array_cap")]
    pub array_cap: usize,

    /// Neutralize spreadsheet formulas in CSV cells
    #[serde(default = "default_sanitize_csv")]
    pub sanitize_csv: bool,

    /// Control-character ratio at which input counts as binary; values outside `(0, 1)` mean the default
    #[serde(default = "default_nonprintable_threshold")]
    pub nonprintable_threshold: f64,

    /// Explicit CSV cell hook
    #[serde(skip)]
    pub csv_cell_sanitizer: Option<CellSanitizer>,
}

/// Returns the default projection depth cap.
fn default_depth_cap() -> usize {
    10
}

/// Returns the default per-leaf match cap.
fn default_array_cap() -> usize {
    1000
}

fn default_sanitize_csv() -> bool {
    true
}

fn default_nonprintable_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for Config {
    /// Creates a new configuration with default values.
    ///
    /// # Default Values
    ///
    /// * `depth_cap`: 10
    /// * `array_cap`: 1000
    /// * `sanitize_csv`: true
    /// * `nonprintable_threshold`: 0.05
    /// * `csv_cell_sanitizer`: none
    fn default() -> Self {
        Self {
            depth_cap: default_depth_cap(),
            array_cap: default_array_cap(),
            sanitize_csv: default_sanitize_csv(),
            nonprintable_threshold: default_nonprintable_threshold(),
            csv_cell_sanitizer: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("depth_cap", &self.depth_cap)
            .field("array_cap", &self.array_cap)
            .field("sanitize_csv", &self.sanitize_csv)
            .field("nonprintable_threshold", &self.nonprintable_threshold)
            .field("csv_cell_sanitizer", &self.csv_cell_sanitizer.is_some())
            .finish()
    }
}

impl Config {
    /// Installs an explicit CSV cell sanitizer.
    pub fn with_cell_sanitizer<F>(mut self, sanitizer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.csv_cell_sanitizer = Some(Arc::new(sanitizer));
        self
    }

    /// Returns the sanitizer CSV cells should go through, if any.
    ///
    /// An explicit `csv_cell_sanitizer` wins; otherwise the formula
    /// neutralizer is used when `sanitize_csv` is set.
    pub fn cell_sanitizer(&self) -> Option<CellSanitizer> {
        if let Some(sanitizer) = &self.csv_cell_sanitizer {
            return Some(Arc::clone(sanitizer));
        }
        if self.sanitize_csv {
            return Some(Arc::new(neutralize_formula));
        }
        None
    }

    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/unifio/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("unifio");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        let config_path = match Self::config_path() {
            Some(path) => path,
            None => return Self::default(),
        };

        if !config_path.exists() {
            return Self::default();
        }

        match Self::from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring unreadable config file");
                Self::default()
            }
        }
    }

    /// Loads configuration from an explicit TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
