/*
 * math.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * TeX math notation: `$inline$` and `$$display$$`.
 */

use noteproc_ast::{Node, NodeKind, Position};
use once_cell::sync::Lazy;
use regex::Regex;

use super::rewrite_text;
use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

static INLINE_MATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([^\s$](?:[^$\n]*[^\s$])?)\$").expect("inline math pattern is valid")
});

/// Recognises math notation in text.
///
/// A paragraph that starts and ends with `$$` becomes a display math
/// block; `$...$` inside text becomes inline math.
pub struct Math;

impl Stage for Math {
    fn name(&self) -> &str {
        "math"
    }

    fn transform(&self, tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
        display_math(tree);
        rewrite_text(tree, &mut |value, position| {
            if !INLINE_MATH.is_match(value) {
                return None;
            }
            Some(split_inline(value, position))
        });
        Ok(())
    }
}

fn display_math(node: &mut Node) {
    for child in &mut node.children {
        if let Some(value) = display_value(child) {
            *child = Node::new(NodeKind::Math { value }).with_position(child.position);
        } else if !matches!(child.kind, NodeKind::Code { .. }) {
            display_math(child);
        }
    }
}

fn display_value(node: &Node) -> Option<String> {
    if !matches!(node.kind, NodeKind::Paragraph) {
        return None;
    }
    let [text] = node.children.as_slice() else {
        return None;
    };
    let value = text.value()?.trim();
    let inner = value.strip_prefix("$$")?.strip_suffix("$$")?;
    Some(inner.trim().to_string())
}

fn split_inline(value: &str, position: Option<Position>) -> Vec<Node> {
    let at = |start: usize, end: usize| {
        position
            .filter(|p| p.len() == value.len())
            .map(|p| Position::new(p.start + start, p.start + end))
    };
    let mut nodes = Vec::new();
    let mut last = 0;
    for caps in INLINE_MATH.captures_iter(value) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            nodes.push(
                Node::text(&value[last..whole.start()]).with_position(at(last, whole.start())),
            );
        }
        nodes.push(
            Node::new(NodeKind::InlineMath {
                value: body.as_str().to_string(),
            })
            .with_position(at(whole.start(), whole.end())),
        );
        last = whole.end();
    }
    if last < value.len() {
        nodes.push(Node::text(&value[last..]).with_position(at(last, value.len())));
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hast::{to_hast, to_html};
    use crate::options::{ProcMode, ProcOptions};
    use crate::parse::parse_markdown;
    use insta::assert_snapshot;

    fn html(source: &str) -> String {
        let mut tree = parse_markdown(source);
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::NoData));
        Math.transform(&mut tree, &mut ctx).unwrap();
        to_html(&to_hast(&tree).unwrap())
    }

    #[test]
    fn test_inline_math() {
        assert_snapshot!(
            html("area $a+b$ costs $5 and $6"),
            @r#"<p>area <span class="math math-inline">a+b</span> costs $5 and $6</p>"#
        );
    }

    #[test]
    fn test_display_math() {
        assert_snapshot!(
            html("$$\nx + y\n$$"),
            @r#"<div class="math math-display">x + y</div>"#
        );
    }
}
