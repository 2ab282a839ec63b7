/*
 * hierarchies.rs
 * Copyright (c) 2025 Posit, PBC
 */

use noteproc_ast::{Node, NodeKind, RenderHints};

use crate::Result;
use crate::context::ProcContext;
use crate::engine::NoteProps;
use crate::stage::Stage;

/// Appends a list of the current note's children.
///
/// Rendered as `div.children` with an `h2` title taken from the
/// `hierarchyDisplayTitle` setting. Children opted out of publishing are
/// left out when publishing rules apply.
pub struct Hierarchies;

impl Stage for Hierarchies {
    fn name(&self) -> &str {
        "hierarchies"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        let publishing = ctx.should_apply_publishing_rules();
        if ctx.inside_note_ref || !ctx.config.enable_hierarchy_display(publishing) {
            return Ok(());
        }
        let (Some(note), Some(notes)) = (ctx.current_note(), ctx.notes.as_deref()) else {
            return Ok(());
        };
        let children: Vec<&NoteProps> = note
            .children
            .iter()
            .filter_map(|id| notes.get(id))
            .filter(|child| !publishing || child.is_published())
            .collect();
        if children.is_empty() {
            return Ok(());
        }
        let title = ctx.config.hierarchy_display_title(publishing).to_string();
        tree.children
            .push(link_section("hierarchies", "children", &title, &children));
        Ok(())
    }
}

/// A titled container listing wiki links to `notes`.
pub(super) fn link_section(kind: &str, class: &str, title: &str, notes: &[&NoteProps]) -> Node {
    let items = notes
        .iter()
        .map(|note| {
            let link = Node::new(NodeKind::WikiLink {
                value: note.fname.clone(),
                alias: Some(display_title(note)),
                anchor: None,
            });
            Node::new(NodeKind::ListItem { checked: None }).with_children(vec![link])
        })
        .collect();
    let mut section = Node::new(NodeKind::Unknown {
        type_name: kind.to_string(),
        value: None,
    })
    .with_children(vec![
        Node::new(NodeKind::Heading { depth: 2 }).with_children(vec![Node::text(title)]),
        Node::new(NodeKind::List {
            ordered: true,
            start: None,
        })
        .with_children(items),
    ]);
    section.data.hints =
        Some(RenderHints::named("div").with_property("class", vec![class.to_string()]));
    section
}

fn display_title(note: &NoteProps) -> String {
    if note.title.is_empty() {
        note.fname.clone()
    } else {
        note.title.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcConfig;
    use crate::context::ProcDataInput;
    use crate::engine::{MemoryEngine, Vault};
    use crate::markdown::to_markdown;
    use crate::options::{Destination, ProcMode, ProcOptions};
    use pretty_assertions::assert_eq;

    fn run(config: ProcConfig) -> String {
        let engine = MemoryEngine::new("/ws")
            .with_config(config)
            .with_note(
                NoteProps::new("p", "proj", "main")
                    .with_title("Proj")
                    .with_child("a")
                    .with_child("b"),
            )
            .with_note(NoteProps::new("a", "proj.alpha", "main").with_title("Alpha"))
            .with_note(NoteProps::new("b", "proj.beta", "main").with_title("Beta"))
            .into_arc();
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::Full));
        ctx.merge(
            ProcDataInput::new()
                .with_engine(engine)
                .with_vault(Vault::new("main", "main"))
                .with_fname("proj")
                .with_dest(Destination::Html),
        );
        let mut tree = crate::parse::parse_markdown("Body");
        Hierarchies.transform(&mut tree, &mut ctx).unwrap();
        to_markdown(&tree)
    }

    #[test]
    fn test_lists_children() {
        assert_eq!(
            run(ProcConfig::default()),
            "Body\n\n## Children\n\n1.  [[Alpha|proj.alpha]]\n2.  [[Beta|proj.beta]]\n"
        );
    }

    #[test]
    fn test_disabled_by_config() {
        let config =
            ProcConfig::from_yaml_str("preview:\n  enableHierarchyDisplay: false\n").unwrap();
        assert_eq!(run(config), "Body\n");
    }
}
