// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Asset name filtering.

use crate::config::ConfigError;
use regex::Regex;

/// Pattern that accepts every asset without compiling a regex.
pub const MATCH_ALL: &str = ".*";

/// Predicate deciding which assets the filter processes.
///
/// The pattern must match the whole asset name, not a substring of it.
#[derive(Debug, Clone, Default)]
pub enum AssetMatcher {
    /// Accept every asset.
    #[default]
    All,
    /// Accept assets fully matching the pattern.
    Pattern { source: String, regex: Regex },
}

impl AssetMatcher {
    /// Compile a matcher from a pattern.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        if pattern == MATCH_ALL {
            return Ok(Self::All);
        }

        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self::Pattern {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Check if an asset name passes this matcher.
    pub fn matches(&self, asset: &str) -> bool {
        match self {
            Self::All => true,
            Self::Pattern { regex, .. } => regex.is_match(asset),
        }
    }

    /// Get the pattern this matcher was built from.
    pub fn pattern(&self) -> &str {
        match self {
            Self::All => MATCH_ALL,
            Self::Pattern { source, .. } => source,
        }
    }
}
