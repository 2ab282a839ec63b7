/*
 * stage.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The tree transformation trait implemented by every pipeline stage.
 */

//! Tree transformation stages.
//!
//! A [`Stage`] is one step of a [`Pipeline`](crate::Pipeline). Stages run
//! in the order the builder selected and receive the pipeline's
//! [`ProcContext`] by `&mut`, so any data they share travels through the
//! context rather than through global state.
//!
//! # Example
//!
//! ```ignore
//! use noteproc_core::{Stage, ProcContext, Result};
//! use noteproc_ast::Node;
//!
//! struct Uppercase;
//!
//! impl Stage for Uppercase {
//!     fn name(&self) -> &str { "uppercase" }
//!
//!     fn transform(&self, tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
//!         tree.walk_mut(&mut |node| {
//!             if let Some(value) = node.value_mut() {
//!                 *value = value.to_uppercase();
//!             }
//!         });
//!         Ok(())
//!     }
//! }
//! ```

use noteproc_ast::Node;

use crate::Result;
use crate::context::ProcContext;
use crate::diagnostic::DiagnosticMessage;

/// Trait for tree transformations.
///
/// Stages must be `Send + Sync` so that independent pipelines can be built
/// and run on different threads.
pub trait Stage: Send + Sync {
    /// Stable name of the stage.
    ///
    /// Used for logging, diagnostics and [`Pipeline::stage_names`](crate::Pipeline::stage_names).
    fn name(&self) -> &str;

    /// Apply the transformation to the tree.
    ///
    /// # Errors
    ///
    /// Returns an error only for conditions the stage deems fatal.
    /// Recoverable problems are recorded with [`ProcContext::add_diagnostic`].
    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()>;
}

/// Record a warning attributed to `stage`.
pub(crate) fn warn(
    ctx: &mut ProcContext,
    stage: &str,
    title: impl Into<String>,
    node: &Node,
) {
    ctx.add_diagnostic(
        DiagnosticMessage::warning(title)
            .with_stage(stage)
            .with_position(node.position),
    );
}
