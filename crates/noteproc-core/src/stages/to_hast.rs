/*
 * to_hast.rs
 * Copyright (c) 2025 Posit, PBC
 */

use noteproc_ast::Node;

use crate::Result;
use crate::context::ProcContext;
use crate::hast::to_hast;
use crate::stage::Stage;

/// Replaces the source tree with its rendering tree.
///
/// Every stage after this one sees elements, text, raw fragments and
/// comments only.
pub struct ToHast;

impl Stage for ToHast {
    fn name(&self) -> &str {
        "to-hast"
    }

    fn transform(&self, tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
        *tree = to_hast(tree)?;
        Ok(())
    }
}
