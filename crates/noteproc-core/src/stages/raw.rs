/*
 * raw.rs
 * Copyright (c) 2025 Posit, PBC
 */

use noteproc_ast::{Node, NodeKind};

use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

/// Embeds raw HTML fragments in the rendering tree.
///
/// A fragment that is exactly one HTML comment becomes a comment node; any
/// other fragment stays raw and is written verbatim.
pub struct Raw;

impl Stage for Raw {
    fn name(&self) -> &str {
        "raw"
    }

    fn transform(&self, tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
        tree.walk_mut(&mut |node| {
            if let NodeKind::Raw { value } = &node.kind
                && let Some(comment) = as_comment(value)
            {
                node.kind = NodeKind::Comment { value: comment };
            }
        });
        Ok(())
    }
}

fn as_comment(value: &str) -> Option<String> {
    let inner = value.trim().strip_prefix("<!--")?.strip_suffix("-->")?;
    (!inner.contains("-->")).then(|| inner.to_string())
}
