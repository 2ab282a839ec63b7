/*
 * block_anchors.rs
 * Copyright (c) 2025 Posit, PBC
 */

use noteproc_ast::{Node, NodeKind, PropValue, RenderHints};

use crate::Result;
use crate::context::ProcContext;
use crate::options::Destination;
use crate::stage::Stage;

/// Renders `^anchor` markers as invisible link targets in HTML output.
pub struct BlockAnchors;

impl Stage for BlockAnchors {
    fn name(&self) -> &str {
        "block-anchors"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        if ctx.dest != Some(Destination::Html) {
            return Ok(());
        }
        tree.walk_mut(&mut |node| {
            if let NodeKind::BlockAnchor { id } = &node.kind {
                node.data.hints = Some(anchor_hints(id));
            }
        });
        Ok(())
    }
}

fn anchor_hints(id: &str) -> RenderHints {
    RenderHints::named("a")
        .with_property("aria-hidden", "true")
        .with_property(
            "class",
            PropValue::List(vec![
                "block-anchor".to_string(),
                "anchor-heading".to_string(),
                "icon-link".to_string(),
            ]),
        )
        .with_property("id", format!("^{id}"))
        .with_property("href", format!("#^{id}"))
        .with_children(Vec::new())
}
