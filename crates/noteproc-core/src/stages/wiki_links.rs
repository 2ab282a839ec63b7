/*
 * wiki_links.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Wiki link resolution.
 */

use noteproc_ast::{Node, NodeKind, PropValue, RenderHints};

use super::renders_links;
use crate::Result;
use crate::context::ProcContext;
use crate::options::Destination;
use crate::stage::{Stage, warn};

/// URL of a note page.
///
/// HTML output links to `.html` pages; the markdown destinations link to
/// the bare target.
pub fn note_url(prefix: &str, target: &str, anchor: Option<&str>, html: bool) -> String {
    let mut url = format!("{prefix}{target}");
    if html {
        url.push_str(".html");
    }
    if let Some(anchor) = anchor {
        url.push('#');
        url.push_str(anchor);
    }
    url
}

/// Turns `[[alias|target#anchor]]` into a link.
///
/// The link remembers the target in its data (`note-fname`, plus `note-id`
/// when the note exists) so later stages can recompute the URL. When a
/// note lookup is available, links to unknown notes get the `broken` class
/// and a warning.
pub struct WikiLinks;

impl Stage for WikiLinks {
    fn name(&self) -> &str {
        "wiki-links"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        if renders_links(ctx) {
            convert_wiki_links(tree, ctx, self.name());
        }
        Ok(())
    }
}

/// Convert every wiki link in `tree` to a link node.
pub(crate) fn convert_wiki_links(tree: &mut Node, ctx: &mut ProcContext, stage: &str) {
    let html = ctx.dest == Some(Destination::Html);
    let prefix = ctx.wiki_links.prefix.clone().unwrap_or_default();
    let mut broken = Vec::new();
    tree.walk_mut(&mut |node| {
        let NodeKind::WikiLink {
            value,
            alias,
            anchor,
        } = &node.kind
        else {
            return;
        };
        let note = ctx.find_note(value);
        let target = match note {
            Some(note) if ctx.wiki_links.use_id => note.id.clone(),
            _ => value.clone(),
        };
        let label = alias.clone().unwrap_or_else(|| value.clone());

        node.data.set("note-fname", value.clone());
        if let Some(note) = note {
            node.data.set("note-id", note.id.clone());
        }
        if let Some(anchor) = anchor {
            node.data.set("anchor", anchor.clone());
        }
        if note.is_none() && ctx.notes.is_some() {
            node.data.set("broken", true);
            add_class(node.data.hints_mut(), "broken");
            broken.push((value.clone(), node.clone()));
        }
        node.kind = NodeKind::Link {
            url: note_url(&prefix, &target, anchor.as_deref(), html),
            title: None,
        };
        node.children = vec![Node::text(label).with_position(node.position)];
    });
    for (target, node) in broken {
        warn(ctx, stage, format!("link to unknown note `{target}`"), &node);
    }
}

/// Add `class` to the hinted class list, keeping classes already there.
pub(crate) fn add_class(hints: &mut RenderHints, class: &str) {
    let classes = match hints.properties.remove("class") {
        Some(PropValue::List(mut items)) => {
            items.push(class.to_string());
            items
        }
        Some(PropValue::String(existing)) => vec![existing, class.to_string()],
        _ => vec![class.to_string()],
    };
    hints
        .properties
        .insert("class".into(), PropValue::List(classes));
}
