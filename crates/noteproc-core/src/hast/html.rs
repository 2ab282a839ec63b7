/*
 * html.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rendering tree to HTML serialization.
 */

//! HTML serialization of rendering trees.
//!
//! Elements are written with their properties as attributes, text is
//! escaped, `raw` nodes are written verbatim and comments as `<!--..-->`.
//! Source-dialect nodes that were never converted are written as their
//! text content.

use std::io::{self, Write};

use noteproc_ast::{Node, NodeKind, PropValue};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serialize a rendering tree to an HTML string.
pub fn to_html(node: &Node) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec does not fail
    let _ = write(node, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write a rendering tree as HTML.
pub fn write<W: Write>(node: &Node, buf: &mut W) -> io::Result<()> {
    match &node.kind {
        NodeKind::Root => write_children(node, buf),
        NodeKind::Element {
            tag_name,
            properties,
        } => {
            write!(buf, "<{tag_name}")?;
            for (key, value) in properties {
                match value {
                    PropValue::Bool(true) => write!(buf, " {key}")?,
                    other => {
                        if let Some(text) = other.to_attr_value() {
                            write!(buf, " {key}=\"{}\"", escape_html(&text))?;
                        }
                    }
                }
            }
            write!(buf, ">")?;
            if VOID_ELEMENTS.contains(&tag_name.as_str()) {
                return Ok(());
            }
            write_children(node, buf)?;
            write!(buf, "</{tag_name}>")
        }
        NodeKind::Text { value } => write!(buf, "{}", escape_html(value)),
        NodeKind::Raw { value } => write!(buf, "{value}"),
        NodeKind::Comment { value } => write!(buf, "<!--{value}-->"),
        _ => write!(buf, "{}", escape_html(&node.to_plain_text())),
    }
}

fn write_children<W: Write>(node: &Node, buf: &mut W) -> io::Result<()> {
    for child in &node.children {
        write(child, buf)?;
    }
    Ok(())
}

fn escape_html(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use noteproc_ast::properties;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_void_and_boolean_attributes() {
        let input = Node::element(
            "input",
            properties([
                ("type", PropValue::from("checkbox")),
                ("checked", PropValue::from(false)),
                ("disabled", PropValue::from(true)),
            ]),
            Vec::new(),
        );
        assert_eq!(to_html(&input), r#"<input type="checkbox" disabled>"#);
    }

    #[test]
    fn test_class_lists_and_raw() {
        let node = Node::root(vec![
            Node::element(
                "div",
                properties([("class", vec!["a".to_string(), "b".to_string()])]),
                vec![Node::text("x < y")],
            ),
            Node::new(NodeKind::Raw {
                value: "<b>raw</b>".into(),
            }),
            Node::new(NodeKind::Comment { value: " c ".into() }),
        ]);
        assert_eq!(
            to_html(&node),
            r#"<div class="a b">x &lt; y</div><b>raw</b><!-- c -->"#
        );
    }
}
