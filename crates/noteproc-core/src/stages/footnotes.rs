/*
 * footnotes.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::collections::HashSet;

use noteproc_ast::{Node, NodeKind, Position};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::Result;
use crate::context::ProcContext;
use crate::stage::{Stage, warn};

/// `[^label]` left as text: the parser only emits references whose
/// definition exists.
static UNRESOLVED_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\^([^\]\s]+)\]").expect("footnote reference pattern is valid"));

/// Moves footnote definitions to the end of the document in order of first
/// reference and reports references without a definition.
pub struct Footnotes;

impl Stage for Footnotes {
    fn name(&self) -> &str {
        "footnotes"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        let (mut definitions, rest): (Vec<Node>, Vec<Node>) = std::mem::take(&mut tree.children)
            .into_iter()
            .partition(|c| matches!(c.kind, NodeKind::FootnoteDefinition { .. }));
        tree.children = rest;
        let defined: HashSet<String> = definitions.iter().filter_map(label).collect();

        let mut order: Vec<String> = Vec::new();
        let mut undefined: Vec<(String, Node)> = Vec::new();
        tree.walk(&mut |node| match &node.kind {
            NodeKind::FootnoteReference { label } => {
                if !order.contains(label) {
                    order.push(label.clone());
                }
                if !defined.contains(label) {
                    undefined.push((label.clone(), node.clone()));
                }
            }
            NodeKind::Text { value } => {
                for caps in UNRESOLVED_REFERENCE.captures_iter(value) {
                    let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                        continue;
                    };
                    if defined.contains(name.as_str()) {
                        continue;
                    }
                    let position = node
                        .position
                        .filter(|p| p.len() == value.len())
                        .map(|p| Position::new(p.start + whole.start(), p.start + whole.end()));
                    let reference = Node::text(whole.as_str()).with_position(position);
                    undefined.push((name.as_str().to_string(), reference));
                }
            }
            _ => {}
        });

        for (label, reference) in &undefined {
            warn(
                ctx,
                self.name(),
                format!("footnote `{label}` is referenced but never defined"),
                reference,
            );
        }

        definitions.sort_by_key(|def| {
            label(def)
                .and_then(|l| order.iter().position(|o| *o == l))
                .unwrap_or(usize::MAX)
        });
        tree.children.extend(definitions);
        Ok(())
    }
}

fn label(node: &Node) -> Option<String> {
    match &node.kind {
        NodeKind::FootnoteReference { label } | NodeKind::FootnoteDefinition { label } => {
            Some(label.clone())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ProcMode, ProcOptions};
    use crate::parse::parse_markdown;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_definitions_follow_reference_order() {
        let mut tree = parse_markdown(
            "[^b]: second\n\nText[^a] and[^b] and[^missing].\n\n[^a]: first\n",
        );
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::NoData));
        Footnotes.transform(&mut tree, &mut ctx).unwrap();

        let labels: Vec<_> = tree.children.iter().filter_map(label).collect();
        assert_eq!(labels, ["a", "b"]);
        assert_eq!(tree.children[0].type_name(), "paragraph");
        assert_eq!(ctx.diagnostics.len(), 1);
        assert!(ctx.diagnostics[0].title.contains("missing"));
    }

    #[test]
    fn test_reference_without_definition_is_reported() {
        let mut tree = parse_markdown("x[^nope] y");
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::NoData));
        Footnotes.transform(&mut tree, &mut ctx).unwrap();

        assert_eq!(ctx.diagnostics.len(), 1);
        let diagnostic = &ctx.diagnostics[0];
        assert_eq!(
            diagnostic.title,
            "footnote `nope` is referenced but never defined"
        );
        assert_eq!(diagnostic.stage.as_deref(), Some("footnotes"));
        assert_eq!(diagnostic.position, Some(Position::new(1, 8)));
    }

    #[test]
    fn test_defined_references_are_quiet() {
        let mut tree = parse_markdown("x[^n] y\n\n[^n]: note\n\n`[^code]`");
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::NoData));
        Footnotes.transform(&mut tree, &mut ctx).unwrap();
        assert!(ctx.diagnostics.is_empty());
    }
}
