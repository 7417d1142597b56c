//! Configuration file support.
//!
//! ```toml
//! dialect = "postgres"
//! default_limit = 25
//! database_url = "sqlite::memory:"
//!
//! [templates]
//! recent_orders = "SELECT * FROM orders WHERE created_at >= $since"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::dialect::Dialect;
use crate::error::{SqlVaryError, SqlVaryResult};
use crate::template::TemplateEngine;

fn default_limit() -> u64 {
    10
}

/// sqlvary configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Dialect used when `--dialect` is not given.
    #[serde(default)]
    pub dialect: Dialect,

    /// LIMIT used by `build` when `--limit` is given without a value.
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Database for `exec` when neither the flag nor the environment sets one.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Extra named templates, added on top of the built-in ones.
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            default_limit: default_limit(),
            database_url: None,
            templates: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Default config location: `<config dir>/sqlvary/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sqlvary").join("config.toml"))
    }

    pub fn from_toml(text: &str) -> SqlVaryResult<Self> {
        toml::from_str(text).map_err(|e| SqlVaryError::Config(e.to_string()))
    }

    /// Load a config file that must exist.
    pub fn from_file(path: impl AsRef<Path>) -> SqlVaryResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SqlVaryError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load an explicit path, or the default location if it exists, or
    /// fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> SqlVaryResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(path),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Built-in templates plus the configured ones.
    pub fn template_engine(&self) -> TemplateEngine {
        let mut engine = TemplateEngine::new();
        for (name, text) in &self.templates {
            engine.add_template(name.clone(), text);
        }
        engine
    }
}
