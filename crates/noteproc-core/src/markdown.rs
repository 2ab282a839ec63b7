/*
 * markdown.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Syntax tree to markdown serialization.
 */

//! Markdown serialization.
//!
//! Writes a source tree back to the note dialect. List markers and item
//! indentation follow the `bullet` and `listItemIndent` values the
//! `list-format` stage stores on list nodes; unannotated lists use `*` and
//! tab-width indentation.

use noteproc_ast::{Align, Node, NodeKind};

use crate::hast::to_html;

/// Serialize a source tree as markdown.
pub fn to_markdown(tree: &Node) -> String {
    let mut out = block(tree);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn blocks(nodes: &[Node]) -> String {
    nodes
        .iter()
        .map(block)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn block(node: &Node) -> String {
    match &node.kind {
        NodeKind::Root => blocks(&node.children),
        NodeKind::Paragraph | NodeKind::TableCell => inline(&node.children),
        NodeKind::Heading { depth } => {
            format!("{} {}", "#".repeat(usize::from(*depth)), inline(&node.children))
        }
        NodeKind::ThematicBreak => "***".to_string(),
        NodeKind::Blockquote => prefix_lines(&blocks(&node.children), "> ", "> "),
        NodeKind::List { ordered, start } => list(node, *ordered, start.unwrap_or(1)),
        NodeKind::ListItem { .. } => list_item(node, "-", 2),
        NodeKind::Html { value } | NodeKind::Raw { value } => value.clone(),
        NodeKind::Code { lang, meta, value } => {
            let info = [lang.as_deref(), meta.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            format!("```{info}\n{value}\n```")
        }
        NodeKind::Yaml { value } => format!("---\n{value}\n---"),
        NodeKind::Math { value } => format!("$$\n{value}\n$$"),
        NodeKind::Table { align } => table(node, align),
        NodeKind::TableRow => table_row(node),
        NodeKind::FootnoteDefinition { label } => {
            let content = blocks(&node.children);
            prefix_lines(&content, &format!("[^{label}]: "), "    ")
        }
        NodeKind::Element { .. } => to_html(node),
        NodeKind::Comment { value } => format!("<!--{value}-->"),
        NodeKind::Unknown { value, .. } => match value {
            Some(value) => value.clone(),
            None if node.children.iter().any(is_block) => blocks(&node.children),
            None => inline(&node.children),
        },
        _ => inline(std::slice::from_ref(node)),
    }
}

fn is_block(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::ThematicBreak
            | NodeKind::Blockquote
            | NodeKind::List { .. }
            | NodeKind::Code { .. }
            | NodeKind::Table { .. }
            | NodeKind::Math { .. }
    )
}

fn inline(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match &node.kind {
            NodeKind::Text { value } => out.push_str(value),
            NodeKind::Emphasis => out.push_str(&format!("_{}_", inline(&node.children))),
            NodeKind::Strong => out.push_str(&format!("**{}**", inline(&node.children))),
            NodeKind::Delete => out.push_str(&format!("~~{}~~", inline(&node.children))),
            NodeKind::InlineCode { value } => out.push_str(&format!("`{value}`")),
            NodeKind::InlineMath { value } => out.push_str(&format!("${value}$")),
            NodeKind::Break => out.push_str("\\\n"),
            NodeKind::Link { url, title } => {
                out.push_str(&format!("[{}]({url}{})", inline(&node.children), title_suffix(title)))
            }
            NodeKind::Image { url, alt, title } => {
                out.push_str(&format!("![{alt}]({url}{})", title_suffix(title)))
            }
            NodeKind::FootnoteReference { label } => out.push_str(&format!("[^{label}]")),
            NodeKind::WikiLink {
                value,
                alias,
                anchor,
            } => {
                out.push_str("[[");
                if let Some(alias) = alias {
                    out.push_str(alias);
                    out.push('|');
                }
                out.push_str(value);
                if let Some(anchor) = anchor {
                    out.push('#');
                    out.push_str(anchor);
                }
                out.push_str("]]");
            }
            NodeKind::NoteRef { value, anchor } => {
                out.push_str("![[");
                out.push_str(value);
                if let Some(anchor) = anchor {
                    out.push('#');
                    out.push_str(anchor);
                }
                out.push_str("]]");
            }
            NodeKind::Hashtag { value } => out.push_str(&format!("#{value}")),
            NodeKind::UserTag { value } => out.push_str(&format!("@{value}")),
            NodeKind::BlockAnchor { id } => out.push_str(&format!("^{id}")),
            NodeKind::Abbr { abbr, .. } => out.push_str(abbr),
            NodeKind::Html { value } | NodeKind::Raw { value } => out.push_str(value),
            NodeKind::Unknown { value: Some(value), .. } => out.push_str(value),
            _ if is_block(node) => out.push_str(&block(node)),
            _ => out.push_str(&inline(&node.children)),
        }
    }
    out
}

fn title_suffix(title: &Option<String>) -> String {
    title
        .as_ref()
        .map(|t| format!(" \"{t}\""))
        .unwrap_or_default()
}

fn list(node: &Node, ordered: bool, start: u64) -> String {
    let bullet = node.data.get_str("bullet").unwrap_or("*");
    let one_space = node.data.get_str("listItemIndent") == Some("one");
    let tight = !node
        .children
        .iter()
        .any(|item| item.children.iter().any(|c| matches!(c.kind, NodeKind::Paragraph)));

    let items: Vec<String> = node
        .children
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let marker = if ordered {
                format!("{}.", start + index as u64)
            } else {
                bullet.to_string()
            };
            let width = if one_space { marker.len() + 1 } else { 4 };
            list_item(item, &marker, width)
        })
        .collect();
    items.join(if tight { "\n" } else { "\n\n" })
}

fn list_item(item: &Node, marker: &str, width: usize) -> String {
    let loose = item
        .children
        .iter()
        .any(|c| matches!(c.kind, NodeKind::Paragraph));
    let mut content = if loose {
        blocks(&item.children)
    } else {
        tight_blocks(&item.children)
    };
    if let NodeKind::ListItem {
        checked: Some(checked),
    } = item.kind
    {
        content = format!("[{}] {content}", if checked { "x" } else { " " });
    }
    let first = format!("{marker:<width$}");
    prefix_lines(&content, &first, &" ".repeat(width))
}

/// Inline runs and blocks of a tight list item, one per line.
fn tight_blocks(nodes: &[Node]) -> String {
    let mut parts = Vec::new();
    let mut run: Vec<Node> = Vec::new();
    for node in nodes {
        if is_block(node) {
            if !run.is_empty() {
                parts.push(inline(&std::mem::take(&mut run)));
            }
            parts.push(block(node));
        } else {
            run.push(node.clone());
        }
    }
    if !run.is_empty() {
        parts.push(inline(&run));
    }
    parts.join("\n")
}

fn table(node: &Node, align: &[Align]) -> String {
    let mut lines: Vec<String> = node.children.iter().map(table_row).collect();
    let delimiter = align
        .iter()
        .map(|a| match a {
            Align::None => "---",
            Align::Left => ":--",
            Align::Center => ":-:",
            Align::Right => "--:",
        })
        .collect::<Vec<_>>()
        .join(" | ");
    let position = usize::from(!lines.is_empty());
    lines.insert(position, format!("| {delimiter} |"));
    lines.join("\n")
}

fn table_row(row: &Node) -> String {
    let cells = row
        .children
        .iter()
        .map(|cell| inline(&cell.children))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("| {cells} |")
}

fn prefix_lines(text: &str, first: &str, rest: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(index, line)| {
            let prefix = if index == 0 { first } else { rest };
            if line.is_empty() && index > 0 {
                prefix.trim_end().to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_markdown;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_paragraphs_and_inline() {
        let tree = parse_markdown("# Hi\n\nSome **bold** and [[Foo|foo#bar]] text.");
        assert_eq!(
            to_markdown(&tree),
            "# Hi\n\nSome **bold** and [[Foo|foo#bar]] text.\n"
        );
    }

    #[test]
    fn test_list_uses_annotations() {
        let mut tree = parse_markdown("* a\n* b\n");
        assert_eq!(to_markdown(&tree), "*   a\n*   b\n");
        let list = &mut tree.children[0];
        list.data.set("bullet", "-");
        list.data.set("listItemIndent", "one");
        assert_eq!(to_markdown(&tree), "- a\n- b\n");
    }

    #[test]
    fn test_table_and_code() {
        let tree = parse_markdown("a | b\n:-|--\n1 | 2\n\n```js\nx\n```\n");
        assert_eq!(
            to_markdown(&tree),
            "| a | b |\n| :-- | --- |\n| 1 | 2 |\n\n```js\nx\n```\n"
        );
    }

    #[test]
    fn test_frontmatter_roundtrip() {
        let tree = parse_markdown("---\ntitle: x\n---\n\nbody\n");
        assert_eq!(to_markdown(&tree), "---\ntitle: x\n---\n\nbody\n");
    }
}
