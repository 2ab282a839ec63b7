/*
 * list_format.rs
 * Copyright (c) 2025 Posit, PBC
 */

use noteproc_ast::{Node, NodeKind};

use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

/// Normalizes list serialization to `-` bullets and one-space indentation.
pub struct ListFormat;

impl Stage for ListFormat {
    fn name(&self) -> &str {
        "list-format"
    }

    fn transform(&self, tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
        tree.walk_mut(&mut |node| {
            if matches!(node.kind, NodeKind::List { .. }) {
                node.data.set("bullet", "-");
                node.data.set("listItemIndent", "one");
            }
        });
        Ok(())
    }
}
