//! Typegen configuration loading from YAML files
//!
//! Lets a project pin naming and pruning behavior in a checked-in file
//! instead of repeating CLI flags.

use crate::{Result, TypegenError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root structure of a `typegen.yaml` file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TypegenConfig {
    /// Config format version
    pub version: u32,
    /// Identifier naming options
    pub naming: NamingConfig,
    /// Schema names that are always kept when pruning
    pub retain: Vec<String>,
    /// Drop declarations unreachable from retained names
    pub prune_unused: bool,
    /// Output file options
    pub output: OutputConfig,
}

/// Identifier naming options
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Extra words escaped when used as field names, on top of the built-in keywords
    pub reserved_words: Vec<String>,
}

/// Output file options
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Name of the rendered types file
    pub file_name: String,
}

impl Default for TypegenConfig {
    fn default() -> Self {
        Self {
            version: 1,
            naming: NamingConfig::default(),
            retain: Vec::new(),
            prune_unused: false,
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: "types.bal".to_string(),
        }
    }
}

impl TypegenConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TypegenError::Parse(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            TypegenError::Parse(msg) => {
                TypegenError::Parse(format!("{} (in {:?})", msg, path))
            }
            other => other,
        })
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| TypegenError::Parse(format!("Failed to parse config YAML: {}", e)))?;

        if config.version != 1 {
            return Err(TypegenError::Parse(format!(
                "Unsupported config version {}",
                config.version
            )));
        }

        Ok(config)
    }
}
