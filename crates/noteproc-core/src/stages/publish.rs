/*
 * publish.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Publishing transform: titles, note link URLs and note reference portals.
 */

//! The publishing transform.
//!
//! One stage, configured per use:
//!
//! - `insert_title` puts the note title in an `h1` at the top of the body.
//! - `transform_no_publish` turns links to notes that opted out of
//!   publishing into plain text.
//! - For HTML output, wiki links that earlier stages synthesized are
//!   converted, note links get their URL recomputed from the note they
//!   point at (under `link_prefix` when one is set), and note references
//!   become portal containers holding the referenced content.
//!
//! URLs are recomputed from the `note-fname` / `note-id` data the
//! `wiki-links` stage leaves on links, so running the stage twice with
//! different prefixes yields the second prefix.

use noteproc_ast::{Node, NodeKind, RenderHints};

use super::note_refs::expand_note_ref;
use super::wiki_links::{convert_wiki_links, note_url};
use super::{rewrite_paragraphs, split_paragraph};
use crate::Result;
use crate::context::ProcContext;
use crate::options::{Destination, ProcFlavor};
use crate::stage::Stage;

#[derive(Debug, Clone, Default)]
pub struct Publish {
    pub insert_title: bool,
    pub transform_no_publish: bool,
    pub link_prefix: Option<String>,
    /// Expand note references into portals (HTML only)
    pub expand_note_refs: bool,
}

impl Publish {
    /// The main publishing pass.
    pub fn new(insert_title: bool, transform_no_publish: bool) -> Self {
        Self {
            insert_title,
            transform_no_publish,
            link_prefix: None,
            expand_note_refs: true,
        }
    }

    /// A pass that only rewrites note link URLs under `prefix`.
    pub fn with_link_prefix(prefix: impl Into<String>) -> Self {
        Self {
            link_prefix: Some(prefix.into()),
            ..Self::default()
        }
    }
}

impl Stage for Publish {
    fn name(&self) -> &str {
        "publish"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        if self.insert_title {
            insert_title(tree, ctx);
        }
        let html = ctx.dest == Some(Destination::Html);
        if html && ctx.wiki_links.converts_links() {
            convert_wiki_links(tree, ctx, self.name());
        }
        self.rewrite_links(tree, ctx, html);
        if html && self.expand_note_refs {
            let stage = self.name();
            rewrite_paragraphs(tree, &mut |paragraph| {
                split_paragraph(paragraph, &mut |child| match &child.kind {
                    NodeKind::NoteRef { value, anchor } => {
                        Ok(expand_note_ref(ctx, stage, child, value, anchor.as_deref())?
                            .map(|blocks| vec![portal(child, blocks)]))
                    }
                    _ => Ok(None),
                })
            })?;
        }
        Ok(())
    }
}

impl Publish {
    fn rewrite_links(&self, tree: &mut Node, ctx: &ProcContext, html: bool) {
        let prefix = self
            .link_prefix
            .clone()
            .or_else(|| ctx.publish.link_prefix.clone())
            .or_else(|| ctx.wiki_links.prefix.clone())
            .unwrap_or_default();
        let by_id = ctx.wiki_links.use_id || ctx.flavor() == ProcFlavor::Publishing;

        tree.walk_mut(&mut |node| {
            let NodeKind::Link { url, .. } = &mut node.kind else {
                return;
            };
            let Some(fname) = node.data.get_str("note-fname") else {
                return;
            };
            let note = ctx.find_note(fname);
            if self.transform_no_publish && note.is_some_and(|n| !n.is_published()) {
                let label = node.to_plain_text();
                *node = Node::text(label).with_position(node.position);
                return;
            }
            if !html {
                return;
            }
            let target = match note {
                Some(note) if by_id => note.id.as_str(),
                _ => fname,
            };
            *url = note_url(&prefix, target, node.data.get_str("anchor"), true);
        });
    }
}

fn insert_title(tree: &mut Node, ctx: &ProcContext) {
    let Some(note) = ctx.current_note() else {
        return;
    };
    let heading =
        Node::new(NodeKind::Heading { depth: 1 }).with_children(vec![Node::text(&note.title)]);
    let index = usize::from(
        tree.children
            .first()
            .is_some_and(|c| matches!(c.kind, NodeKind::Yaml { .. })),
    );
    tree.children.insert(index, heading);
}

fn portal(reference: &Node, blocks: Vec<Node>) -> Node {
    let mut node = Node::new(NodeKind::Unknown {
        type_name: "noteRefPortal".to_string(),
        value: None,
    })
    .with_children(blocks)
    .with_position(reference.position);
    node.data.hints = Some(
        RenderHints::named("div").with_property("class", vec!["portal-container".to_string()]),
    );
    node
}
