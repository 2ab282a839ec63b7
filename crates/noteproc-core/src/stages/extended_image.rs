/*
 * extended_image.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Images followed by a `{key: value}` property block.
 */

use noteproc_ast::{Node, NodeKind};
use serde_json::Value;

use crate::Result;
use crate::context::ProcContext;
use crate::stage::{Stage, warn};

/// Moves a `{...}` block written right after an image into the image's
/// `style` property.
///
/// `![alt](a.png){width: 50%, float: right}` renders as an image with
/// `style="width: 50%; float: right"`.
pub struct ExtendedImage;

impl Stage for ExtendedImage {
    fn name(&self) -> &str {
        "extended-image"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        extend_images(tree, ctx, self.name());
        Ok(())
    }
}

fn extend_images(node: &mut Node, ctx: &mut ProcContext, stage: &str) {
    for index in 0..node.children.len() {
        let is_image = matches!(node.children[index].kind, NodeKind::Image { .. });
        if !is_image || index + 1 >= node.children.len() {
            extend_images(&mut node.children[index], ctx, stage);
            continue;
        }
        let Some(text) = node.children[index + 1].value() else {
            continue;
        };
        let Some((block, rest)) = split_props(text) else {
            continue;
        };
        match parse_style(block) {
            Ok(style) => {
                let rest = rest.to_string();
                node.children[index]
                    .data
                    .hints_mut()
                    .properties
                    .insert("style".into(), style.into());
                if let Some(value) = node.children[index + 1].value_mut() {
                    *value = rest;
                }
            }
            Err(message) => {
                let image = node.children[index].clone();
                warn(ctx, stage, message, &image);
            }
        }
    }
    node.children.retain(|c| !matches!(&c.kind, NodeKind::Text { value } if value.is_empty()));
}

/// Split `{...}rest` into the block body and the rest.
fn split_props(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix('{')?;
    let end = inner.find('}')?;
    Some((&text[..end + 2], &inner[end + 1..]))
}

fn parse_style(block: &str) -> std::result::Result<String, String> {
    let props: Value =
        serde_yaml::from_str(block).map_err(|err| format!("invalid image properties: {err}"))?;
    let Value::Object(map) = props else {
        return Err("image properties must be a mapping".to_string());
    };
    Ok(map
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{key}: {s}"),
            other => format!("{key}: {other}"),
        })
        .collect::<Vec<_>>()
        .join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hast::{to_hast, to_html};
    use crate::options::{ProcMode, ProcOptions};
    use crate::parse::parse_markdown;

    fn run(source: &str) -> (Node, ProcContext) {
        let mut tree = parse_markdown(source);
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::NoData));
        ExtendedImage.transform(&mut tree, &mut ctx).unwrap();
        (tree, ctx)
    }

    #[test]
    fn test_style_from_props() {
        let (tree, _) = run("![cat](cat.png){width: 50%, float: right} after");
        let html = to_html(&to_hast(&tree).unwrap());
        assert_eq!(
            html,
            r#"<p><img src="cat.png" alt="cat" style="width: 50%; float: right"> after</p>"#
        );
    }

    #[test]
    fn test_block_only_is_removed() {
        let (tree, _) = run("![cat](cat.png){width: 10px}");
        assert_eq!(tree.children[0].children.len(), 1);
    }

    #[test]
    fn test_invalid_props_warn() {
        let (tree, ctx) = run("![cat](cat.png){width: [}");
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(tree.children[0].children.len(), 2);
    }
}
