//!
//! Configuration loading: reads the YAML rule file into a generic value,
//! deserializes the `global` section, and hands the rest to the tag rule
//! model for validation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yml::Value;
use thiserror::Error;

use crate::rule::{RuleError, TagRuleSet};

/// File names probed in the working directory when `--config` is not given.
pub const CONFIG_FILE_CANDIDATES: &[&str] = &["doctag.yml", "doctag.yaml", ".doctag.yml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Io { source: io::Error, path: String },
    #[error("failed to parse config file at {path}: {source}")]
    Yaml {
        source: serde_yml::Error,
        path: String,
    },
    #[error("no configuration file found (tried doctag.yml, doctag.yaml, .doctag.yml)")]
    NotFound,
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Global options outside the tag rules.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// File/directory glob patterns to process exclusively.
    pub include: Vec<String>,
    /// File/directory glob patterns to skip.
    pub exclude: Vec<String>,
    /// Respect .gitignore files when scanning directories.
    pub respect_gitignore: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            respect_gitignore: true,
        }
    }
}

/// Complete validated configuration: global options plus the tag rule set.
#[derive(Debug)]
pub struct Config {
    pub global: GlobalConfig,
    pub tags: TagRuleSet,
}

/// Load and validate the configuration, discovering the file when no
/// explicit path is given.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) => PathBuf::from(p),
        None => discover_config_file().ok_or(ConfigError::NotFound)?,
    };
    let display = path.display().to_string();
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        source,
        path: display.clone(),
    })?;
    load_from_str(&raw, &display)
}

/// Parse configuration text. `path` is only used in error messages.
pub fn load_from_str(raw: &str, path: &str) -> Result<Config, ConfigError> {
    let doc: Value = serde_yml::from_str(raw).map_err(|source| ConfigError::Yaml {
        source,
        path: path.to_string(),
    })?;

    let global = match doc.get("global") {
        Some(section) => {
            serde_yml::from_value(section.clone()).map_err(|source| ConfigError::Yaml {
                source,
                path: path.to_string(),
            })?
        }
        None => GlobalConfig::default(),
    };

    let tags = TagRuleSet::from_value(&doc)?;
    Ok(Config { global, tags })
}

fn discover_config_file() -> Option<PathBuf> {
    CONFIG_FILE_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}
