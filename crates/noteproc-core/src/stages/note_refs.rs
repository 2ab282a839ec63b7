/*
 * note_refs.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Expansion of `![[note]]` references.
 */

//! Note references.
//!
//! A reference `![[fname]]` or `![[fname#Heading]]` is replaced by the
//! referenced note's content, parsed and transformed by a nested pipeline
//! whose context is derived from the current one with
//! [`ProcContext::nested_data`]. Nesting stops at [`MAX_REF_LVL`] so that
//! notes referencing each other cannot recurse forever.

use noteproc_ast::{Node, NodeKind};

use super::{rewrite_paragraphs, slugify, split_paragraph};
use crate::Result;
use crate::builder;
use crate::context::ProcContext;
use crate::engine::Vault;
use crate::options::{Destination, ProcMode, ProcOptions};
use crate::stage::{Stage, warn};

/// Deepest nesting level at which references are still expanded.
pub const MAX_REF_LVL: usize = 3;

/// Inlines referenced notes for the markdown destinations.
///
/// The note dialect destination keeps references as written.
pub struct NoteRefs;

impl Stage for NoteRefs {
    fn name(&self) -> &str {
        "note-refs"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        if matches!(ctx.dest, None | Some(Destination::MdDendron)) {
            return Ok(());
        }
        let stage = self.name();
        rewrite_paragraphs(tree, &mut |paragraph| {
            split_paragraph(paragraph, &mut |child| match &child.kind {
                NodeKind::NoteRef { value, anchor } => {
                    expand_note_ref(ctx, stage, child, value, anchor.as_deref())
                }
                _ => Ok(None),
            })
        })
    }
}

/// The blocks that replace reference `node`, or `None` to keep it as is.
///
/// Missing notes, missing anchors and the depth limit are reported as
/// warnings attributed to `stage`.
pub(crate) fn expand_note_ref(
    ctx: &mut ProcContext,
    stage: &str,
    node: &Node,
    fname: &str,
    anchor: Option<&str>,
) -> Result<Option<Vec<Node>>> {
    if ctx.note_ref_level >= MAX_REF_LVL {
        warn(
            ctx,
            stage,
            format!("note reference to `{fname}` exceeds the maximum depth of {MAX_REF_LVL}"),
            node,
        );
        return Ok(None);
    }
    let Some(note) = ctx.find_note(fname).cloned() else {
        warn(ctx, stage, format!("note `{fname}` not found"), node);
        return Ok(None);
    };

    let vault = match &ctx.vault {
        Some(current) if current.name == note.vault => None,
        _ => Some(Vault::new(note.vault.clone(), note.vault.clone())),
    };
    let options = ProcOptions::new(ProcMode::Full)
        .with_flavor(ctx.flavor())
        .with_parse_only(true);
    let mut nested = builder::build(options, ctx.nested_data(&note.fname, vault))?;
    let tree = nested.process(&note.body);
    ctx.add_diagnostics(nested.take_diagnostics());
    let tree = tree?;

    let blocks: Vec<Node> = tree
        .children
        .into_iter()
        .filter(|c| !matches!(c.kind, NodeKind::Yaml { .. }))
        .collect();
    match anchor {
        None => Ok(Some(blocks)),
        Some(anchor) => match select_anchor(blocks, anchor) {
            Some(section) => Ok(Some(section)),
            None => {
                warn(
                    ctx,
                    stage,
                    format!("anchor `{anchor}` not found in note `{fname}`"),
                    node,
                );
                Ok(None)
            }
        },
    }
}

/// The part of `blocks` an anchor points at.
///
/// `^id` selects the block holding that block anchor. Anything else names
/// a heading, matched by text or slug, and selects it together with the
/// blocks up to the next heading of the same or a higher level.
fn select_anchor(blocks: Vec<Node>, anchor: &str) -> Option<Vec<Node>> {
    if let Some(id) = anchor.strip_prefix('^') {
        let block = blocks.into_iter().find(|block| {
            let mut found = false;
            block.walk(&mut |n| {
                found |= matches!(&n.kind, NodeKind::BlockAnchor { id: i } if i == id);
            });
            found
        })?;
        return Some(vec![block]);
    }

    let slug = slugify(anchor);
    let start = blocks.iter().position(|block| {
        matches!(block.kind, NodeKind::Heading { .. }) && {
            let text = block.to_plain_text();
            text.eq_ignore_ascii_case(anchor) || slugify(&text) == slug
        }
    })?;
    let NodeKind::Heading { depth } = blocks[start].kind else {
        return None;
    };
    let end = blocks[start + 1..]
        .iter()
        .position(|b| matches!(b.kind, NodeKind::Heading { depth: d } if d <= depth))
        .map_or(blocks.len(), |offset| start + 1 + offset);
    Some(blocks[start..end].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProcDataInput;
    use crate::engine::{MemoryEngine, NoteProps};
    use crate::markdown::to_markdown;
    use pretty_assertions::assert_eq;

    fn engine() -> std::sync::Arc<dyn crate::engine::NoteEngine> {
        MemoryEngine::new("/ws")
            .with_note(NoteProps::new("root", "root", "main").with_body("Start ![[child]] end"))
            .with_note(
                NoteProps::new("child", "child", "main")
                    .with_body("---\nid: child\n---\n\n# One\n\nfirst ^blk\n\n## Sub\n\nsub\n\n# Two\n\nsecond"),
            )
            .with_note(NoteProps::new("loop", "loop", "main").with_body("again ![[loop]]"))
            .into_arc()
    }

    fn ctx() -> ProcContext {
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::Full));
        ctx.merge(
            ProcDataInput::new()
                .with_engine(engine())
                .with_vault(Vault::new("main", "main"))
                .with_fname("root")
                .with_dest(Destination::MdRegular),
        );
        ctx
    }

    fn expand(source: &str) -> (String, ProcContext) {
        let mut ctx = ctx();
        let mut tree = crate::parse::parse_markdown(source);
        NoteRefs.transform(&mut tree, &mut ctx).unwrap();
        (to_markdown(&tree), ctx)
    }

    #[test]
    fn test_heading_section() {
        let (out, ctx) = expand("![[child#one]]");
        assert_eq!(out, "# One\n\nfirst ^blk\n\n## Sub\n\nsub\n");
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_block_anchor() {
        let (out, _) = expand("![[child#^blk]]");
        assert_eq!(out, "first ^blk\n");
    }

    #[test]
    fn test_paragraph_is_split() {
        let (out, _) = expand("before ![[child#two]] after");
        assert_eq!(out, "before\n\n# Two\n\nsecond\n\nafter\n");
    }

    #[test]
    fn test_missing_note_is_kept() {
        let (out, ctx) = expand("![[nope]]");
        assert_eq!(out, "![[nope]]\n");
        assert_eq!(ctx.diagnostics.len(), 1);
    }

    #[test]
    fn test_depth_limit() {
        let (out, ctx) = expand("![[loop]]");
        assert_eq!(out, "again\n\nagain\n\nagain ![[loop]]\n");
        assert_eq!(ctx.diagnostics.len(), 1);
        assert!(ctx.diagnostics[0].title.contains("maximum depth"));
    }

    #[test]
    fn test_note_dialect_keeps_refs() {
        let mut ctx = ctx();
        ctx.dest = Some(Destination::MdDendron);
        let mut tree = crate::parse::parse_markdown("![[child]]");
        NoteRefs.transform(&mut tree, &mut ctx).unwrap();
        assert_eq!(to_markdown(&tree), "![[child]]\n");
    }
}
