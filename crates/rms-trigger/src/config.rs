// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Filter configuration.
//!
//! Supports both programmatic and file-based configuration. Keys use the
//! host option names (`triggerAsset`, `addSampleNo`, ...), so a TOML or
//! JSON document written for the host maps onto [`FilterConfig`] directly.
//! Every option is optional and falls back to its documented default.

use crate::matcher::AssetMatcher;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid asset filter '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Kind of edge condition watched on the trigger datapoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum TriggerType {
    /// Fire when the signal crosses zero.
    #[default]
    ZeroCrossing,
    /// Fire when the signal reverses direction (local peak or trough).
    Peak,
    /// Fire when consecutive samples differ by more than the rapid-edge threshold.
    RapidEdge,
}

impl TriggerType {
    /// Get the option string for this trigger type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroCrossing => "zero crossing",
            Self::Peak => "peak",
            Self::RapidEdge => "rapid edge",
        }
    }

    /// Parse an option string.
    ///
    /// Anything other than `"zero crossing"` or `"rapid edge"` selects
    /// [`TriggerType::Peak`].
    pub fn parse(s: &str) -> Self {
        match s {
            "zero crossing" => Self::ZeroCrossing,
            "rapid edge" => Self::RapidEdge,
            _ => Self::Peak,
        }
    }
}

impl From<String> for TriggerType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<TriggerType> for &'static str {
    fn from(t: TriggerType) -> Self {
        t.as_str()
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Edge polarity of the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum TriggerEdge {
    #[default]
    Rising,
    Falling,
}

impl TriggerEdge {
    /// Get the option string for this edge.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
        }
    }

    /// Parse an option string. Anything other than `"rising"` is falling.
    pub fn parse(s: &str) -> Self {
        if s == "rising" {
            Self::Rising
        } else {
            Self::Falling
        }
    }
}

impl From<String> for TriggerEdge {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<TriggerEdge> for &'static str {
    fn from(e: TriggerEdge) -> Self {
        e.as_str()
    }
}

impl std::fmt::Display for TriggerEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// RMS filter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Asset whose datapoint is watched for triggering.
    #[serde(default)]
    pub trigger_asset: String,

    /// Datapoint name watched for triggering.
    #[serde(default)]
    pub trigger_datapoint: String,

    /// Trigger detector mode.
    #[serde(default)]
    pub trigger_type: TriggerType,

    /// Trigger edge polarity.
    #[serde(default)]
    pub trigger_edge: TriggerEdge,

    /// Output asset name template (`%a` is replaced by the source asset).
    #[serde(default = "default_asset_name")]
    pub asset_name: String,

    /// Include a peak-to-peak datapoint per signal.
    #[serde(default)]
    pub peak: bool,

    /// Forward the original readings alongside the RMS output.
    #[serde(default)]
    pub raw_data: bool,

    /// Regular expression an asset name must fully match to be processed.
    #[serde(default = "default_match", rename = "match")]
    pub asset_filter: String,

    /// Attach a monotonic sample number to emitted (and raw) readings.
    #[serde(default)]
    pub add_sample_no: bool,

    /// Datapoint name used for the sample number.
    #[serde(default = "default_sample_name")]
    pub sample_name: String,

    /// When false, batches pass through untouched.
    #[serde(default = "default_true")]
    pub enable: bool,
}

fn default_asset_name() -> String {
    "%a RMS".to_string()
}

fn default_match() -> String {
    ".*".to_string()
}

fn default_sample_name() -> String {
    "partNo".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            trigger_asset: String::new(),
            trigger_datapoint: String::new(),
            trigger_type: TriggerType::default(),
            trigger_edge: TriggerEdge::default(),
            asset_name: default_asset_name(),
            peak: false,
            raw_data: false,
            asset_filter: default_match(),
            add_sample_no: false,
            sample_name: default_sample_name(),
            enable: true,
        }
    }
}

impl FilterConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.asset_matcher().map(drop)
    }

    /// Validate the configuration and compile its asset filter.
    pub fn asset_matcher(&self) -> Result<AssetMatcher, ConfigError> {
        if self.asset_name.is_empty() {
            return Err(ConfigError::Invalid("Empty output asset name".into()));
        }

        if self.add_sample_no && self.sample_name.is_empty() {
            return Err(ConfigError::Invalid(
                "Sample numbering enabled with an empty sample name".into(),
            ));
        }

        AssetMatcher::new(&self.asset_filter)
    }

    /// Set the trigger signal.
    pub fn trigger(mut self, asset: impl Into<String>, datapoint: impl Into<String>) -> Self {
        self.trigger_asset = asset.into();
        self.trigger_datapoint = datapoint.into();
        self
    }

    /// Set the trigger mode.
    pub fn trigger_type(mut self, trigger_type: TriggerType) -> Self {
        self.trigger_type = trigger_type;
        self
    }

    /// Set the trigger edge.
    pub fn trigger_edge(mut self, edge: TriggerEdge) -> Self {
        self.trigger_edge = edge;
        self
    }

    /// Set the output asset name template.
    pub fn asset_name(mut self, template: impl Into<String>) -> Self {
        self.asset_name = template.into();
        self
    }

    /// Include peak-to-peak datapoints.
    pub fn peak(mut self, enabled: bool) -> Self {
        self.peak = enabled;
        self
    }

    /// Forward raw readings.
    pub fn raw_data(mut self, enabled: bool) -> Self {
        self.raw_data = enabled;
        self
    }

    /// Set the asset filter pattern.
    pub fn asset_filter(mut self, pattern: impl Into<String>) -> Self {
        self.asset_filter = pattern.into();
        self
    }

    /// Enable sample numbering under the given datapoint name.
    pub fn sample_numbering(mut self, name: impl Into<String>) -> Self {
        self.add_sample_no = true;
        self.sample_name = name.into();
        self
    }

    /// Enable or disable the filter.
    pub fn enable(mut self, enabled: bool) -> Self {
        self.enable = enabled;
        self
    }
}
