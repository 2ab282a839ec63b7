/*
 * mermaid.rs
 * Copyright (c) 2025 Posit, PBC
 */

use noteproc_ast::{Node, NodeKind, RenderHints};

use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

/// Renders ```` ```mermaid ```` blocks as `div.mermaid` containers for the
/// client-side diagram renderer. Markdown output keeps the fence.
pub struct Mermaid;

impl Stage for Mermaid {
    fn name(&self) -> &str {
        "mermaid"
    }

    fn transform(&self, tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
        tree.walk_mut(&mut |node| {
            if let NodeKind::Code {
                lang: Some(lang),
                value,
                ..
            } = &node.kind
                && lang == "mermaid"
            {
                let hints = RenderHints::named("div")
                    .with_property("class", vec!["mermaid".to_string()])
                    .with_children(vec![Node::text(value.clone())]);
                node.data.hints = Some(hints);
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hast::{to_hast, to_html};
    use crate::markdown::to_markdown;
    use crate::options::{ProcMode, ProcOptions};
    use crate::parse::parse_markdown;
    use insta::assert_snapshot;

    #[test]
    fn test_mermaid_container() {
        let mut tree = parse_markdown("```mermaid\ngraph TD; A-->B\n```\n");
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::NoData));
        Mermaid.transform(&mut tree, &mut ctx).unwrap();
        assert_snapshot!(
            to_html(&to_hast(&tree).unwrap()),
            @r#"<div class="mermaid">graph TD; A--&gt;B</div>"#
        );
        assert_eq!(to_markdown(&tree), "```mermaid\ngraph TD; A-->B\n```\n");
    }
}
