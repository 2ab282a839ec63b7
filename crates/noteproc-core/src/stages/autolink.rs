/*
 * autolink.rs
 * Copyright (c) 2025 Posit, PBC
 */

use noteproc_ast::{Node, PropValue, properties};

use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Prepends an invisible anchor link to every heading that has an id.
///
/// The link is hidden from the accessibility tree, carries the
/// `anchor-heading icon-link` classes and has empty text; themes show an
/// icon on hover.
pub struct AutolinkHeadings;

impl Stage for AutolinkHeadings {
    fn name(&self) -> &str {
        "autolink-headings"
    }

    fn transform(&self, tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
        tree.walk_mut(&mut |node| {
            if !node.tag_name().is_some_and(|t| HEADINGS.contains(&t)) {
                return;
            }
            let Some(PropValue::String(id)) = node.properties().and_then(|p| p.get("id")) else {
                return;
            };
            let link = Node::element(
                "a",
                properties([
                    ("aria-hidden", PropValue::from("true")),
                    (
                        "class",
                        PropValue::List(vec!["anchor-heading".into(), "icon-link".into()]),
                    ),
                    ("href", PropValue::from(format!("#{id}"))),
                ]),
                vec![Node::text("")],
            );
            node.children.insert(0, link);
        });
        Ok(())
    }
}
