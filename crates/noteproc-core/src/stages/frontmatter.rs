/*
 * frontmatter.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Extraction of substitution variables from the frontmatter block.
 */

use noteproc_ast::{Node, NodeKind};
use serde_json::Value;

use crate::Result;
use crate::context::ProcContext;
use crate::stage::{Stage, warn};

/// Reads the leading YAML block into `fm` when nothing set it earlier.
///
/// Variables taken from the container's note win over the block.
pub struct Frontmatter;

impl Stage for Frontmatter {
    fn name(&self) -> &str {
        "frontmatter"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        let Some(yaml) = tree
            .children
            .iter()
            .find(|c| matches!(c.kind, NodeKind::Yaml { .. }))
        else {
            return Ok(());
        };
        if ctx.fm.is_some() {
            return Ok(());
        }
        let source = yaml.value().unwrap_or_default();
        match serde_yaml::from_str::<Value>(source) {
            Ok(Value::Object(map)) => ctx.fm = Some(map),
            Ok(Value::Null) => {}
            Ok(_) => warn(ctx, self.name(), "frontmatter is not a mapping", yaml),
            Err(err) => warn(ctx, self.name(), format!("invalid frontmatter: {err}"), yaml),
        }
        Ok(())
    }
}
