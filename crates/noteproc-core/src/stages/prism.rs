/*
 * prism.rs
 * Copyright (c) 2025 Posit, PBC
 */

use noteproc_ast::{Node, PropValue};

use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

/// Prepares code blocks for syntax highlighting.
///
/// The `language-*` class of a `code` element is copied to its `pre`
/// parent, as highlighter themes style both. Blocks without a language are
/// left alone.
pub struct Prism;

impl Stage for Prism {
    fn name(&self) -> &str {
        "prism"
    }

    fn transform(&self, tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
        tree.walk_mut(&mut |node| {
            if node.tag_name() != Some("pre") {
                return;
            }
            let Some(class) = node
                .children
                .iter()
                .filter(|c| c.tag_name() == Some("code"))
                .find_map(language_class)
            else {
                return;
            };
            if let Some(props) = node.properties_mut() {
                props.replace("class".into(), PropValue::List(vec![class]));
            }
        });
        Ok(())
    }
}

fn language_class(code: &Node) -> Option<String> {
    let classes = match code.properties()?.get("class")? {
        PropValue::List(items) => items.clone(),
        PropValue::String(s) => s.split_whitespace().map(str::to_string).collect(),
        PropValue::Bool(_) => return None,
    };
    classes.into_iter().find(|c| c.starts_with("language-"))
}
