// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Output asset naming.

/// Token replaced by the source asset name.
pub const ASSET_TOKEN: &str = "%a";

/// Output asset name template.
///
/// The first `%a` is replaced by the source asset name. A template without
/// the token names every output reading the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNameTemplate {
    template: String,
}

impl AssetNameTemplate {
    /// Create a new template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Resolve the output asset name for a source asset.
    pub fn resolve(&self, asset: &str) -> String {
        self.template.replacen(ASSET_TOKEN, asset, 1)
    }

    /// Get the raw template string.
    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl Default for AssetNameTemplate {
    fn default() -> Self {
        Self::new("%a RMS")
    }
}
