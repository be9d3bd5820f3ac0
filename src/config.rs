//! Report configuration file
//!
//! An optional YAML file tunes the report without repeating flags in every
//! pipeline step:
//!
//! ```yaml
//! style: github          # github | azure | markdown
//! show_attributes: true
//! max_attribute_width: 120
//! ```
//!
//! Command-line flags take precedence over values from the file.

use crate::diff::{CollapseStyle, ReportOptions};
use crate::traits::FileSystem;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(default)]
    pub style: Option<CollapseStyle>,

    #[serde(default)]
    pub show_attributes: Option<bool>,

    #[serde(default)]
    pub max_attribute_width: Option<usize>,
}

impl ReportConfig {
    /// Load configuration from a YAML file
    pub fn from_file(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        if !fs.exists(path) {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let content = fs.read_to_string(path)?;

        // An empty file is a valid, empty config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Render options from this config, falling back to defaults
    pub fn to_options(&self) -> ReportOptions {
        let defaults = ReportOptions::default();

        ReportOptions {
            style: self.style.unwrap_or(defaults.style),
            show_attributes: self.show_attributes.unwrap_or(defaults.show_attributes),
            max_attribute_width: self.max_attribute_width.or(defaults.max_attribute_width),
        }
    }
}
