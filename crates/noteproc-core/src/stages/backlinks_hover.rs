/*
 * backlinks_hover.rs
 * Copyright (c) 2025 Posit, PBC
 */

use noteproc_ast::{Node, NodeKind, Position, RenderHints};

use super::rewrite_text;
use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

/// Highlights the source range a backlink points at.
///
/// Text overlapping [`ProcContext::backlink_hover`] is wrapped in a
/// `backlinkHover` node that renders as `span.backlink-hover`.
pub struct BacklinksHover;

impl Stage for BacklinksHover {
    fn name(&self) -> &str {
        "backlinks-hover"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        let Some(range) = &ctx.backlink_hover else {
            return Ok(());
        };
        let hover = Position::new(range.start, range.end);
        rewrite_text(tree, &mut |value, position| {
            let position = position.filter(|p| p.len() == value.len())?;
            if !position.overlaps(&hover) {
                return None;
            }
            let start = hover.start.max(position.start) - position.start;
            let end = hover.end.min(position.end) - position.start;
            if start >= end || !value.is_char_boundary(start) || !value.is_char_boundary(end) {
                return None;
            }
            let mut nodes = Vec::with_capacity(3);
            let at = |s: usize, e: usize| {
                Some(Position::new(position.start + s, position.start + e))
            };
            if start > 0 {
                nodes.push(Node::text(&value[..start]).with_position(at(0, start)));
            }
            nodes.push(highlight(&value[start..end], at(start, end)));
            if end < value.len() {
                nodes.push(Node::text(&value[end..]).with_position(at(end, value.len())));
            }
            Some(nodes)
        });
        Ok(())
    }
}

fn highlight(value: &str, position: Option<Position>) -> Node {
    let mut node = Node::new(NodeKind::Unknown {
        type_name: "backlinkHover".to_string(),
        value: None,
    })
    .with_children(vec![Node::text(value).with_position(position)])
    .with_position(position);
    node.data.hints = Some(
        RenderHints::named("span").with_property("class", vec!["backlink-hover".to_string()]),
    );
    node
}
