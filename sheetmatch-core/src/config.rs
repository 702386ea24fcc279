//! Configuration system for sources, locations and categorization rules

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration problems found by [`Config::validate`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Range '{name}' has start {start} greater than end {end}")]
    InvalidRange { name: String, start: u32, end: u32 },

    #[error("Configuration error: '{0}' must not contain empty values")]
    EmptyValue(&'static str),

    #[error("Configuration error: location '{0}' is defined more than once")]
    DuplicateLocation(String),
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Users allowed to run the reconciliation
    #[serde(default = "default_authorized_users")]
    pub authorized_users: Vec<String>,
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Known input locations, selected by index
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub rules: RulesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            authorized_users: default_authorized_users(),
            sources: SourcesConfig::default(),
            locations: Vec::new(),
            rules: RulesConfig::default(),
        }
    }
}

fn default_authorized_users() -> Vec<String> {
    vec!["lauren".to_string()]
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check whether a user name is allowed to run
    pub fn is_authorized(&self, user: &str) -> bool {
        let user = user.trim().to_lowercase();
        self.authorized_users
            .iter()
            .any(|allowed| allowed.trim().to_lowercase() == user)
    }

    /// Get a location by its menu index
    pub fn location(&self, index: usize) -> Option<&Location> {
        self.locations.get(index)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for location in &self.locations {
            if !names.insert(location.name.as_str()) {
                return Err(ConfigError::DuplicateLocation(location.name.clone()));
            }
        }

        self.rules.validate()
    }
}

/// Sheet and column names inside the input workbooks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_sheet")]
    pub identifier_sheet: String,
    /// Header text of the identifier column
    #[serde(default = "default_identifier_column")]
    pub identifier_column: String,
    #[serde(default = "default_sheet")]
    pub primary_sheet: String,
    #[serde(default = "default_sheet")]
    pub secondary_sheet: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            identifier_sheet: default_sheet(),
            identifier_column: default_identifier_column(),
            primary_sheet: default_sheet(),
            secondary_sheet: default_sheet(),
        }
    }
}

fn default_sheet() -> String {
    "Sheet1".to_string()
}

fn default_identifier_column() -> String {
    "AD".to_string()
}

/// Paths of the three input workbooks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub identifiers: PathBuf,
    pub primary: PathBuf,
    pub secondary: PathBuf,
}

/// Categorization rule tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Tokens marking where the model code starts inside a device key, by priority
    #[serde(default = "default_model_markers")]
    pub model_markers: Vec<String>,
    /// Category 1: model keywords
    #[serde(default)]
    pub manual_keywords: Vec<String>,
    /// Category 1: numeric ranges for the last six digits of a device key
    #[serde(default)]
    pub ranges: Vec<NamedRange>,
    /// Category 2
    #[serde(default)]
    pub model_keyword: Option<ModelKeywordConfig>,
    /// Category 3: substring of the device key marking a laptop
    #[serde(default = "default_laptop_marker")]
    pub laptop_marker: Option<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            model_markers: default_model_markers(),
            manual_keywords: Vec::new(),
            ranges: Vec::new(),
            model_keyword: None,
            laptop_marker: default_laptop_marker(),
        }
    }
}

impl RulesConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::EmptyValue("model_markers"));
        }
        if self.manual_keywords.iter().any(|k| k.is_empty()) {
            return Err(ConfigError::EmptyValue("manual_keywords"));
        }
        if self.laptop_marker.as_deref() == Some("") {
            return Err(ConfigError::EmptyValue("laptop_marker"));
        }
        if let Some(rule) = &self.model_keyword {
            if rule.keyword.is_empty() || rule.excluded_key.as_deref() == Some("") {
                return Err(ConfigError::EmptyValue("model_keyword"));
            }
        }

        for range in &self.ranges {
            if range.start > range.end {
                return Err(ConfigError::InvalidRange {
                    name: range.name.clone(),
                    start: range.start,
                    end: range.end,
                });
            }
        }

        Ok(())
    }
}

fn default_model_markers() -> Vec<String> {
    vec!["DPC".to_string(), "LPT".to_string()]
}

fn default_laptop_marker() -> Option<String> {
    Some("lpt".to_string())
}

/// An inclusive barcode range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRange {
    pub name: String,
    pub start: u32,
    pub end: u32,
}

impl NamedRange {
    pub fn contains(&self, value: u32) -> bool {
        self.start <= value && value <= self.end
    }
}

/// Category 2: model contains `keyword` and the key does not contain `excluded_key`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelKeywordConfig {
    pub keyword: String,
    #[serde(default)]
    pub excluded_key: Option<String>,
}
