/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Pipeline stages and the helpers they share.
 */

//! Pipeline stages.
//!
//! Stages are listed here in the order the builder usually installs them.
//! The first group works on the source tree; the rendering group (from
//! [`ToHast`] on) works on the rendering tree.

use noteproc_ast::{Node, NodeKind, Position};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::Result;
use crate::context::ProcContext;
use crate::options::Destination;

mod abbr;
mod autolink;
mod backlinks;
mod backlinks_hover;
mod block_anchors;
mod extended_image;
mod footnotes;
mod frontmatter;
mod hierarchies;
mod hover_preview;
mod katex;
mod list_format;
mod math;
mod mermaid;
mod note_refs;
mod prism;
mod publish;
mod raw;
mod slug;
mod tags;
mod to_hast;
mod variables;
mod wiki_links;

pub use abbr::Abbreviations;
pub use autolink::AutolinkHeadings;
pub use backlinks::Backlinks;
pub use backlinks_hover::BacklinksHover;
pub use block_anchors::BlockAnchors;
pub use extended_image::ExtendedImage;
pub use footnotes::Footnotes;
pub use frontmatter::Frontmatter;
pub use hierarchies::Hierarchies;
pub use hover_preview::HoverPreview;
pub use katex::Katex;
pub use list_format::ListFormat;
pub use math::Math;
pub use mermaid::Mermaid;
pub use note_refs::{MAX_REF_LVL, NoteRefs};
pub use prism::Prism;
pub use publish::Publish;
pub use raw::Raw;
pub use slug::Slug;
pub use tags::{Hashtags, TAGS_HIERARCHY, USERS_HIERARCHY, UserTags};
pub use to_hast::ToHast;
pub use variables::Variables;
pub use wiki_links::{WikiLinks, note_url};

/// Whether wiki-style shorthands are turned into links for this context.
///
/// The note dialect keeps them as written, and so does a pipeline with no
/// destination.
pub(crate) fn renders_links(ctx: &ProcContext) -> bool {
    !matches!(ctx.dest, None | Some(Destination::MdDendron))
}

/// Replace plain text nodes with the nodes `f` returns for them.
///
/// Link and element subtrees are left alone, as are text nodes that already
/// carry data. Returning `None` keeps the text node.
pub(crate) fn rewrite_text(
    node: &mut Node,
    f: &mut impl FnMut(&str, Option<Position>) -> Option<Vec<Node>>,
) {
    if matches!(
        node.kind,
        NodeKind::Link { .. } | NodeKind::Element { .. } | NodeKind::Code { .. }
    ) {
        return;
    }
    let children = std::mem::take(&mut node.children);
    let mut rewritten = Vec::with_capacity(children.len());
    for mut child in children {
        if let NodeKind::Text { value } = &child.kind
            && child.data.is_empty()
            && let Some(replacement) = f(value, child.position)
        {
            rewritten.extend(replacement);
            continue;
        }
        rewrite_text(&mut child, f);
        rewritten.push(child);
    }
    node.children = rewritten;
}

/// Rewrite paragraphs anywhere in the block structure.
///
/// `f` receives each paragraph and returns its replacement blocks, or
/// `None` to keep it. Recurses into blockquotes, lists, list items and
/// footnote definitions.
pub(crate) fn rewrite_paragraphs(
    node: &mut Node,
    f: &mut impl FnMut(&Node) -> Result<Option<Vec<Node>>>,
) -> Result<()> {
    let children = std::mem::take(&mut node.children);
    let mut rewritten = Vec::with_capacity(children.len());
    for mut child in children {
        match child.kind {
            NodeKind::Paragraph => match f(&child)? {
                Some(blocks) => rewritten.extend(blocks),
                None => rewritten.push(child),
            },
            NodeKind::Root
            | NodeKind::Blockquote
            | NodeKind::List { .. }
            | NodeKind::ListItem { .. }
            | NodeKind::FootnoteDefinition { .. } => {
                rewrite_paragraphs(&mut child, f)?;
                rewritten.push(child);
            }
            _ => rewritten.push(child),
        }
    }
    node.children = rewritten;
    Ok(())
}

/// Split a paragraph around the children `expand` replaces with blocks.
///
/// Inline runs before and after an expanded child stay in paragraphs of
/// their own, trimmed; runs made only of whitespace are dropped. Returns `None`
/// when no child was expanded.
pub(crate) fn split_paragraph(
    paragraph: &Node,
    expand: &mut impl FnMut(&Node) -> Result<Option<Vec<Node>>>,
) -> Result<Option<Vec<Node>>> {
    let mut blocks = Vec::new();
    let mut run: Vec<Node> = Vec::new();
    let mut expanded = false;
    for child in &paragraph.children {
        match expand(child)? {
            Some(replacement) => {
                expanded = true;
                flush_run(&mut run, &mut blocks);
                blocks.extend(replacement);
            }
            None => run.push(child.clone()),
        }
    }
    if !expanded {
        return Ok(None);
    }
    flush_run(&mut run, &mut blocks);
    Ok(Some(blocks))
}

fn flush_run(run: &mut Vec<Node>, blocks: &mut Vec<Node>) {
    let mut nodes = std::mem::take(run);
    if let Some(NodeKind::Text { value }) = nodes.first_mut().map(|n| &mut n.kind) {
        *value = value.trim_start().to_string();
    }
    if let Some(NodeKind::Text { value }) = nodes.last_mut().map(|n| &mut n.kind) {
        *value = value.trim_end().to_string();
    }
    let blank = nodes.iter().all(|n| {
        n.value().is_some_and(|v| v.trim().is_empty()) || matches!(n.kind, NodeKind::Break)
    });
    if !blank {
        let position = Position::between(
            nodes.first().and_then(|n| n.position.as_ref()),
            nodes.last().and_then(|n| n.position.as_ref()),
        );
        blocks.push(
            Node::new(NodeKind::Paragraph)
                .with_children(nodes)
                .with_position(position),
        );
    }
}

static SLUG_STRIP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}\p{M}\p{Pc} -]").expect("slug pattern is valid")
});

/// GitHub-style heading slug: lowercase, punctuation removed, spaces to
/// dashes.
pub fn slugify(text: &str) -> String {
    SLUG_STRIP
        .replace_all(&text.to_lowercase(), "")
        .replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_markdown;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  A b"), "--a-b");
        assert_eq!(slugify("Über_uns 2"), "über_uns-2");
    }

    #[test]
    fn test_rewrite_text_skips_links() {
        let mut tree = parse_markdown("foo [foo](x) foo");
        let mut seen = Vec::new();
        rewrite_text(&mut tree, &mut |value, _| {
            seen.push(value.to_string());
            None
        });
        assert_eq!(seen, ["foo ", " foo"]);
    }

    #[test]
    fn test_split_paragraph_drops_blank_runs() {
        let tree = parse_markdown("before ![[other]] ");
        let split = split_paragraph(&tree.children[0], &mut |child| {
            Ok(matches!(child.kind, NodeKind::NoteRef { .. })
                .then(|| vec![Node::new(NodeKind::ThematicBreak)]))
        })
        .unwrap()
        .unwrap();
        let kinds: Vec<_> = split.iter().map(|n| n.type_name()).collect();
        assert_eq!(kinds, ["paragraph", "thematicBreak"]);
    }
}
