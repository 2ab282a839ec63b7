/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Document-processing configuration.
 */

//! Document-processing configuration.
//!
//! Configuration is read from the workspace YAML file. Every toggle exists
//! twice: once for regular previews and once for publishing. Queries take a
//! `publishing` flag that selects the section, since several toggles
//! differ between the two.
//!
//! ```yaml
//! preview:
//!   enableKatex: true
//!   enableMermaid: false
//! publishing:
//!   enableFMTitle: true
//!   assetsPrefix: /docs
//! ```

use serde::{Deserialize, Serialize};

use crate::Result;

/// Toggles of one configuration section.
///
/// Unset toggles fall back to their defaults (`true` for every enable flag).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionConfig {
    pub enable_katex: Option<bool>,
    pub enable_mermaid: Option<bool>,
    #[serde(rename = "enableFMTitle")]
    pub enable_fm_title: Option<bool>,
    pub enable_hierarchy_display: Option<bool>,
    pub hierarchy_display_title: Option<String>,
    pub enable_backlinks: Option<bool>,
    /// Prefix for published asset and note URLs (publishing only)
    pub assets_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcConfig {
    pub preview: SectionConfig,
    pub publishing: SectionConfig,
}

impl ProcConfig {
    /// Parse configuration from workspace YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    fn section(&self, publishing: bool) -> &SectionConfig {
        if publishing {
            &self.publishing
        } else {
            &self.preview
        }
    }

    pub fn enable_katex(&self, publishing: bool) -> bool {
        self.section(publishing).enable_katex.unwrap_or(true)
    }

    pub fn enable_mermaid(&self, publishing: bool) -> bool {
        self.section(publishing).enable_mermaid.unwrap_or(true)
    }

    pub fn enable_fm_title(&self, publishing: bool) -> bool {
        self.section(publishing).enable_fm_title.unwrap_or(true)
    }

    pub fn enable_hierarchy_display(&self, publishing: bool) -> bool {
        self.section(publishing)
            .enable_hierarchy_display
            .unwrap_or(true)
    }

    pub fn hierarchy_display_title(&self, publishing: bool) -> &str {
        self.section(publishing)
            .hierarchy_display_title
            .as_deref()
            .unwrap_or("Children")
    }

    pub fn enable_backlinks(&self, publishing: bool) -> bool {
        self.section(publishing).enable_backlinks.unwrap_or(true)
    }

    /// Asset prefix from the publishing section, without trailing slashes.
    pub fn assets_prefix(&self) -> Option<&str> {
        self.publishing
            .assets_prefix
            .as_deref()
            .map(|p| p.trim_end_matches('/'))
            .filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let config = ProcConfig::default();
        for publishing in [false, true] {
            assert!(config.enable_katex(publishing));
            assert!(config.enable_mermaid(publishing));
            assert!(config.enable_fm_title(publishing));
            assert!(config.enable_backlinks(publishing));
        }
        assert_eq!(config.hierarchy_display_title(false), "Children");
        assert_eq!(config.assets_prefix(), None);
    }

    #[test]
    fn test_sections_are_independent() {
        let config = ProcConfig::from_yaml_str(
            "preview:\n  enableKatex: false\npublishing:\n  enableFMTitle: false\n  assetsPrefix: /docs/\n",
        )
        .unwrap();
        assert!(!config.enable_katex(false));
        assert!(config.enable_katex(true));
        assert!(config.enable_fm_title(false));
        assert!(!config.enable_fm_title(true));
        assert_eq!(config.assets_prefix(), Some("/docs"));
    }

    #[test]
    fn test_empty_yaml() {
        assert_eq!(ProcConfig::from_yaml_str("").unwrap(), ProcConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(ProcConfig::from_yaml_str("preview: [").is_err());
    }
}
