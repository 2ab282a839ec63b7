/*
 * abbr.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Abbreviation definitions and their expansion.
 */

use hashlink::LinkedHashMap;
use noteproc_ast::{Node, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;

use super::rewrite_text;
use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

static DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*\[(?P<abbr>[^\]]+)\]:[ \t]*(?P<reference>.*?)[ \t]*$")
        .expect("abbreviation pattern is valid")
});

/// Collects `*[ABBR]: expansion` lines and marks every use of `ABBR`.
pub struct Abbreviations;

impl Stage for Abbreviations {
    fn name(&self) -> &str {
        "abbr"
    }

    fn transform(&self, tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
        let mut definitions = LinkedHashMap::new();
        tree.children.retain(|child| match definition_lines(child) {
            Some(lines) => {
                definitions.extend(lines);
                false
            }
            None => true,
        });
        if definitions.is_empty() {
            return Ok(());
        }

        let alternatives = definitions
            .keys()
            .map(|abbr: &String| regex::escape(abbr))
            .collect::<Vec<_>>()
            .join("|");
        let Ok(uses) = Regex::new(&format!(r"\b(?:{alternatives})\b")) else {
            return Ok(());
        };

        rewrite_text(tree, &mut |value, _| {
            if !uses.is_match(value) {
                return None;
            }
            let mut nodes = Vec::new();
            let mut last = 0;
            for m in uses.find_iter(value) {
                if m.start() > last {
                    nodes.push(Node::text(&value[last..m.start()]));
                }
                let abbr = m.as_str().to_string();
                let reference = definitions.get(&abbr).cloned().unwrap_or_default();
                nodes.push(Node::new(NodeKind::Abbr { abbr, reference }));
                last = m.end();
            }
            if last < value.len() {
                nodes.push(Node::text(&value[last..]));
            }
            Some(nodes)
        });
        Ok(())
    }
}

/// The definitions of a paragraph made only of definition lines.
fn definition_lines(node: &Node) -> Option<Vec<(String, String)>> {
    if !matches!(node.kind, NodeKind::Paragraph) {
        return None;
    }
    let [child] = node.children.as_slice() else {
        return None;
    };
    let text = match &child.kind {
        NodeKind::Text { value } => value,
        _ => return None,
    };
    text.lines()
        .map(|line| {
            DEFINITION.captures(line).map(|caps| {
                (
                    caps["abbr"].trim().to_string(),
                    caps["reference"].to_string(),
                )
            })
        })
        .collect()
}
