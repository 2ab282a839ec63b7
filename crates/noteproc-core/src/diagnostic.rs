/*
 * diagnostic.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Non-fatal diagnostics recorded by stages.
 */

//! Non-fatal diagnostics.
//!
//! Stages record problems they can recover from as [`DiagnosticMessage`]s
//! on the pipeline context instead of failing the run. The list keeps the
//! order in which stages recorded them.

use noteproc_ast::Position;
use serde::{Deserialize, Serialize};

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    pub kind: DiagnosticKind,
    pub title: String,
    /// Name of the stage that recorded the diagnostic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl DiagnosticMessage {
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            stage: None,
            position: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_position(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Info => "info",
        };
        match &self.stage {
            Some(stage) => write!(f, "{kind}[{stage}]: {}", self.title),
            None => write!(f, "{kind}: {}", self.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let msg = DiagnosticMessage::warning("unresolved link").with_stage("wiki-links");
        assert_eq!(msg.to_string(), "warning[wiki-links]: unresolved link");
        assert_eq!(DiagnosticMessage::info("x").to_string(), "info: x");
    }
}
