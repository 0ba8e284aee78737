//! Panel configuration

use anyhow::{Context, Result};
use esbar_common::constants;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Limits applied when dumping structures to HTML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpOptions {
    /// Containers nested deeper than this are replaced by a placeholder
    #[serde(default = "default_depth")]
    pub depth: usize,

    /// Strings longer than this many characters are cut
    #[serde(default = "default_truncate")]
    pub truncate: usize,

    /// Render dumps folded
    #[serde(default)]
    pub collapse: bool,
}

fn default_depth() -> usize {
    4
}

fn default_truncate() -> usize {
    2000
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            truncate: default_truncate(),
            collapse: false,
        }
    }
}

/// Panel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Product name shown in the tab (default: ElasticSearch)
    #[serde(default = "default_title")]
    pub title: String,

    /// Authority for failed calls when nothing has been logged yet
    #[serde(default = "default_authority")]
    pub default_authority: String,

    /// Path marker identifying search endpoints
    #[serde(default = "default_search_marker")]
    pub search_marker: String,

    /// Re-run search calls with `explain` when rendering
    #[serde(default = "default_explain")]
    pub explain: bool,

    #[serde(default)]
    pub dump: DumpOptions,
}

fn default_title() -> String {
    constants::PRODUCT_NAME.to_string()
}

fn default_authority() -> String {
    constants::DEFAULT_AUTHORITY.to_string()
}

fn default_search_marker() -> String {
    constants::SEARCH_ENDPOINT.to_string()
}

fn default_explain() -> bool {
    true
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            default_authority: default_authority(),
            search_marker: default_search_marker(),
            explain: default_explain(),
            dump: DumpOptions::default(),
        }
    }
}

impl PanelConfig {
    /// Parse a YAML document; missing keys take their defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse panel config")
    }

    /// Load config from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read panel config {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = DumpOptions::default();

        Ok(Self {
            title: env::var("ESBAR_TITLE").unwrap_or_else(|_| default_title()),
            default_authority: env::var("ESBAR_DEFAULT_AUTHORITY")
                .unwrap_or_else(|_| default_authority()),
            search_marker: env::var("ESBAR_SEARCH_MARKER")
                .unwrap_or_else(|_| default_search_marker()),
            explain: match env::var("ESBAR_EXPLAIN") {
                Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidFlag("ESBAR_EXPLAIN"))?,
                Err(_) => default_explain(),
            },
            dump: DumpOptions {
                depth: env_number("ESBAR_DUMP_DEPTH")?.unwrap_or(defaults.depth),
                truncate: env_number("ESBAR_DUMP_TRUNCATE")?.unwrap_or(defaults.truncate),
                collapse: defaults.collapse,
            },
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_number(name: &'static str) -> Result<Option<usize>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(None),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid boolean in environment variable: {0}")]
    InvalidFlag(&'static str),

    #[error("Invalid number in environment variable: {0}")]
    InvalidNumber(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PanelConfig::default();
        assert_eq!(config.title, "ElasticSearch");
        assert_eq!(config.default_authority, "http://localhost:9200");
        assert_eq!(config.search_marker, "_search");
        assert!(config.explain);
        assert_eq!(config.dump.depth, 4);
        assert_eq!(config.dump.truncate, 2000);
    }

    #[test]
    fn test_yaml_partial() {
        let config = PanelConfig::from_yaml_str("explain: false\ndump:\n  depth: 2\n").unwrap();
        assert!(!config.explain);
        assert_eq!(config.dump.depth, 2);
        assert_eq!(config.dump.truncate, 2000);
        assert_eq!(config.title, "ElasticSearch");
    }

    #[test]
    fn test_yaml_invalid() {
        assert!(PanelConfig::from_yaml_str("explain: [").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = PanelConfig::load("/nonexistent/esbar.yml").unwrap_err();
        assert!(err.to_string().contains("Failed to read panel config"));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
