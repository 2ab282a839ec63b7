/*
 * backlinks.rs
 * Copyright (c) 2025 Posit, PBC
 */

use noteproc_ast::Node;

use super::hierarchies::link_section;
use crate::Result;
use crate::context::ProcContext;
use crate::engine::NoteProps;
use crate::stage::Stage;

/// Appends a list of the notes that link to the current note.
pub struct Backlinks;

impl Stage for Backlinks {
    fn name(&self) -> &str {
        "backlinks"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        let publishing = ctx.should_apply_publishing_rules();
        if ctx.inside_note_ref || !ctx.config.enable_backlinks(publishing) {
            return Ok(());
        }
        let (Some(note), Some(notes)) = (ctx.current_note(), ctx.notes.as_deref()) else {
            return Ok(());
        };
        let sources: Vec<&NoteProps> = notes
            .values()
            .filter(|other| other.id != note.id)
            .filter(|other| {
                other
                    .links
                    .iter()
                    .any(|link| link.to.eq_ignore_ascii_case(&note.fname))
            })
            .filter(|other| !publishing || other.is_published())
            .collect();
        if sources.is_empty() {
            return Ok(());
        }
        tree.children
            .push(link_section("backlinks", "backlinks", "Backlinks", &sources));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProcDataInput;
    use crate::engine::{MemoryEngine, Vault};
    use crate::markdown::to_markdown;
    use crate::options::{Destination, ProcMode, ProcOptions};
    use pretty_assertions::assert_eq;

    fn run(inside_note_ref: bool) -> String {
        let engine = MemoryEngine::new("/ws")
            .with_note(NoteProps::new("t", "target", "main").with_link("target"))
            .with_note(
                NoteProps::new("s", "source", "main")
                    .with_title("Source")
                    .with_link("Target"),
            )
            .with_note(NoteProps::new("o", "other", "main").with_link("elsewhere"))
            .into_arc();
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::Full));
        ctx.merge(
            ProcDataInput::new()
                .with_engine(engine)
                .with_vault(Vault::new("main", "main"))
                .with_fname("target")
                .with_dest(Destination::Html)
                .with_inside_note_ref(inside_note_ref),
        );
        let mut tree = crate::parse::parse_markdown("Body");
        Backlinks.transform(&mut tree, &mut ctx).unwrap();
        to_markdown(&tree)
    }

    #[test]
    fn test_lists_linking_notes() {
        assert_eq!(run(false), "Body\n\n## Backlinks\n\n1.  [[Source|source]]\n");
    }

    #[test]
    fn test_skipped_inside_note_refs() {
        assert_eq!(run(true), "Body\n");
    }
}
