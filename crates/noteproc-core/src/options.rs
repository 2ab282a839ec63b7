/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Build-time switches for a processing pipeline.
 */

//! Build-time pipeline options.
//!
//! [`ProcOptions`] is fixed when a pipeline is built and never changes
//! afterwards. It combines three orthogonal axes:
//!
//! - [`ProcMode`] decides which context data is required and validated
//! - [`ProcFlavor`] selects optional stages and alternate stage parameters
//! - `parse_only` decides whether a serializer is attached

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProcError;

/// What data a processor expects to be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcMode {
    /// No document or container data; used to check markdown syntax only.
    NoData,
    /// Document identity, container and destination are all required.
    Full,
    /// The document is not part of the corpus yet (importers).
    Import,
}

impl ProcMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcMode::NoData => "NO_DATA",
            ProcMode::Full => "all data",
            ProcMode::Import => "IMPORT",
        }
    }
}

impl FromStr for ProcMode {
    type Err = ProcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NO_DATA" => Ok(ProcMode::NoData),
            "all data" | "FULL" => Ok(ProcMode::Full),
            "IMPORT" => Ok(ProcMode::Import),
            other => Err(ProcError::ContractViolation(format!(
                "unknown processor mode `{other}`"
            ))),
        }
    }
}

impl std::fmt::Display for ProcMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rendering context a processor runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProcFlavor {
    #[default]
    Regular,
    Preview,
    HoverPreview,
    BacklinksPanelHover,
    Publishing,
}

impl ProcFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcFlavor::Regular => "REGULAR",
            ProcFlavor::Preview => "PREVIEW",
            ProcFlavor::HoverPreview => "HOVER_PREVIEW",
            ProcFlavor::BacklinksPanelHover => "BACKLINKS_PANEL_HOVER",
            ProcFlavor::Publishing => "PUBLISHING",
        }
    }
}

impl FromStr for ProcFlavor {
    type Err = ProcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGULAR" => Ok(ProcFlavor::Regular),
            "PREVIEW" => Ok(ProcFlavor::Preview),
            "HOVER_PREVIEW" => Ok(ProcFlavor::HoverPreview),
            "BACKLINKS_PANEL_HOVER" => Ok(ProcFlavor::BacklinksPanelHover),
            "PUBLISHING" => Ok(ProcFlavor::Publishing),
            other => Err(ProcError::ContractViolation(format!(
                "unknown processor flavor `{other}`"
            ))),
        }
    }
}

/// Where the output of a pipeline is headed.
///
/// The markdown destinations keep the result as a (markdown) tree; only
/// [`Destination::Html`] produces rendered markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    MdDendron,
    MdRegular,
    MdEnhancedPreview,
    Html,
}

impl Destination {
    pub fn is_tree_only(&self) -> bool {
        !matches!(self, Destination::Html)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcOptions {
    pub mode: ProcMode,
    /// `None` is treated as [`ProcFlavor::Regular`].
    pub flavor: Option<ProcFlavor>,
    /// Don't attach a serializer.
    pub parse_only: bool,
}

impl ProcOptions {
    pub fn new(mode: ProcMode) -> Self {
        Self {
            mode,
            flavor: None,
            parse_only: false,
        }
    }

    pub fn with_flavor(mut self, flavor: ProcFlavor) -> Self {
        self.flavor = Some(flavor);
        self
    }

    pub fn with_parse_only(mut self, parse_only: bool) -> Self {
        self.parse_only = parse_only;
        self
    }

    /// Options from textual mode and flavor names.
    ///
    /// # Errors
    ///
    /// Returns [`ProcError::ContractViolation`] for names outside the
    /// declared enums.
    pub fn from_names(mode: &str, flavor: Option<&str>) -> Result<Self, ProcError> {
        let mode = mode.parse::<ProcMode>()?;
        let flavor = flavor.map(str::parse::<ProcFlavor>).transpose()?;
        Ok(Self {
            mode,
            flavor,
            parse_only: false,
        })
    }

    /// The flavor, normalized to `Regular` when unset.
    pub fn flavor(&self) -> ProcFlavor {
        self.flavor.unwrap_or_default()
    }
}
