/*
 * parse.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Source text to syntax tree.
 */

//! Markdown parsing.
//!
//! Builds a [`Node`] tree from the `pulldown-cmark` event stream, keeping
//! byte positions, then recognises the note dialect in text nodes with
//! [`crate::syntax::tokenize_tree`].

use std::ops::Range;

use noteproc_ast::{Align, Node, NodeKind, Position};
use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag,
};

use crate::syntax::tokenize_tree;

/// Parser options used for every document.
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
}

/// Parse source text into a syntax tree rooted at a `root` node.
pub fn parse_markdown(source: &str) -> Node {
    let mut builder = TreeBuilder::new(source.len());
    for (event, range) in Parser::new_ext(source, parser_options()).into_offset_iter() {
        builder.event(event, range);
    }
    let mut root = builder.finish();
    tokenize_tree(&mut root);
    root
}

struct TreeBuilder {
    stack: Vec<Node>,
}

impl TreeBuilder {
    fn new(len: usize) -> Self {
        Self {
            stack: vec![Node::root(Vec::new()).with_position(Some(Position::new(0, len)))],
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        let position = Some(Position::new(range.start, range.end));
        match event {
            Event::Start(tag) => {
                let node = Node::new(start_kind(tag)).with_position(position);
                self.stack.push(node);
            }
            Event::End(_) => self.close(),
            Event::Text(text) => self.push_text(&text, position),
            Event::SoftBreak => self.push_text("\n", position),
            Event::Code(code) => self.push(
                Node::new(NodeKind::InlineCode {
                    value: code.to_string(),
                })
                .with_position(position),
            ),
            Event::Html(html) => self.push_text(&html, position),
            Event::InlineHtml(html) => self.push(
                Node::new(NodeKind::Html {
                    value: html.to_string(),
                })
                .with_position(position),
            ),
            Event::InlineMath(math) => self.push(
                Node::new(NodeKind::InlineMath {
                    value: math.to_string(),
                })
                .with_position(position),
            ),
            Event::DisplayMath(math) => self.push(
                Node::new(NodeKind::Math {
                    value: math.to_string(),
                })
                .with_position(position),
            ),
            Event::FootnoteReference(label) => self.push(
                Node::new(NodeKind::FootnoteReference {
                    label: label.to_string(),
                })
                .with_position(position),
            ),
            Event::HardBreak => self.push(Node::new(NodeKind::Break).with_position(position)),
            Event::Rule => self.push(Node::new(NodeKind::ThematicBreak).with_position(position)),
            Event::TaskListMarker(checked) => {
                let item = self
                    .stack
                    .iter_mut()
                    .rev()
                    .find(|n| matches!(n.kind, NodeKind::ListItem { .. }));
                if let Some(Node {
                    kind: NodeKind::ListItem { checked: slot },
                    ..
                }) = item
                {
                    *slot = Some(checked);
                }
            }
        }
    }

    fn push(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    /// Append text, merging with a preceding text sibling.
    fn push_text(&mut self, text: &str, position: Option<Position>) {
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        if let Some(last) = parent.children.last_mut()
            && let NodeKind::Text { value } = &mut last.kind
        {
            value.push_str(text);
            last.position = Position::between(last.position.as_ref(), position.as_ref());
            return;
        }
        parent.children.push(Node::text(text).with_position(position));
    }

    fn close(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        let Some(node) = self.stack.pop() else {
            return;
        };
        let node = finish_node(node);
        self.push(node);
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack.pop().unwrap_or_else(|| Node::root(Vec::new()))
    }
}

/// Turn collected literal children into the node's value.
fn finish_node(mut node: Node) -> Node {
    match &mut node.kind {
        NodeKind::Code { value, .. } | NodeKind::Yaml { value } | NodeKind::Html { value } => {
            let text: String = node.children.drain(..).filter_map(|c| c.value().map(str::to_string)).collect();
            *value = text.strip_suffix('\n').unwrap_or(&text).to_string();
        }
        NodeKind::Image { alt, .. } => {
            *alt = node.children.drain(..).map(|c| c.to_plain_text()).collect();
        }
        _ => {}
    }
    node
}

fn start_kind(tag: Tag<'_>) -> NodeKind {
    match tag {
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Heading { level, .. } => NodeKind::Heading {
            depth: heading_depth(level),
        },
        Tag::BlockQuote(_) => NodeKind::Blockquote,
        Tag::CodeBlock(kind) => {
            let info = match kind {
                CodeBlockKind::Fenced(info) => info.to_string(),
                CodeBlockKind::Indented => String::new(),
            };
            let mut parts = info.trim().splitn(2, char::is_whitespace);
            let lang = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
            let meta = parts
                .next()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            NodeKind::Code {
                lang,
                meta,
                value: String::new(),
            }
        }
        Tag::HtmlBlock => NodeKind::Html {
            value: String::new(),
        },
        Tag::List(start) => NodeKind::List {
            ordered: start.is_some(),
            start,
        },
        Tag::Item => NodeKind::ListItem { checked: None },
        Tag::FootnoteDefinition(label) => NodeKind::FootnoteDefinition {
            label: label.to_string(),
        },
        Tag::Table(alignments) => NodeKind::Table {
            align: alignments.into_iter().map(align).collect(),
        },
        Tag::TableHead | Tag::TableRow => NodeKind::TableRow,
        Tag::TableCell => NodeKind::TableCell,
        Tag::Emphasis => NodeKind::Emphasis,
        Tag::Strong => NodeKind::Strong,
        Tag::Strikethrough => NodeKind::Delete,
        Tag::Link {
            dest_url, title, ..
        } => NodeKind::Link {
            url: dest_url.to_string(),
            title: Some(title.to_string()).filter(|t| !t.is_empty()),
        },
        Tag::Image {
            dest_url, title, ..
        } => NodeKind::Image {
            url: dest_url.to_string(),
            alt: String::new(),
            title: Some(title.to_string()).filter(|t| !t.is_empty()),
        },
        Tag::MetadataBlock(_) => NodeKind::Yaml {
            value: String::new(),
        },
        // Extensions that are not enabled in `parser_options`
        _ => NodeKind::Unknown {
            type_name: "container".to_string(),
            value: None,
        },
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn align(alignment: Alignment) -> Align {
    match alignment {
        Alignment::None => Align::None,
        Alignment::Left => Align::Left,
        Alignment::Center => Align::Center,
        Alignment::Right => Align::Right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn types(node: &Node) -> Vec<&str> {
        node.children.iter().map(Node::type_name).collect()
    }

    #[test]
    fn test_paragraph_and_heading() {
        let tree = parse_markdown("# Title\n\nHello *world*\nagain");
        assert_eq!(types(&tree), ["heading", "paragraph"]);
        assert_eq!(tree.children[0].kind, NodeKind::Heading { depth: 1 });
        let para = &tree.children[1];
        assert_eq!(types(para), ["text", "emphasis", "text"]);
        assert_eq!(para.children[2].value(), Some("\nagain"));
    }

    #[test]
    fn test_frontmatter_and_code() {
        let tree = parse_markdown("---\ntitle: x\n---\n\n```rust numbered\nfn main() {}\n```\n");
        assert_eq!(types(&tree), ["yaml", "code"]);
        assert_eq!(tree.children[0].value(), Some("title: x"));
        assert_eq!(
            tree.children[1].kind,
            NodeKind::Code {
                lang: Some("rust".into()),
                meta: Some("numbered".into()),
                value: "fn main() {}".into(),
            }
        );
    }

    #[test]
    fn test_table_rows_and_alignment() {
        let tree = parse_markdown("a | b\n:-|--:\n1 | 2\n");
        let table = &tree.children[0];
        assert_eq!(
            table.kind,
            NodeKind::Table {
                align: vec![Align::Left, Align::Right]
            }
        );
        assert_eq!(types(table), ["tableRow", "tableRow"]);
        assert_eq!(table.children[1].children[1].to_plain_text(), "2");
    }

    #[test]
    fn test_task_list_and_image_alt() {
        let tree = parse_markdown("- [x] done\n\n![an *image*](a.png)");
        let item = &tree.children[0].children[0];
        assert_eq!(item.kind, NodeKind::ListItem { checked: Some(true) });
        let image = &tree.children[1].children[0];
        assert!(matches!(&image.kind, NodeKind::Image { alt, .. } if alt == "an image"));
        assert!(image.children.is_empty());
    }

    #[test]
    fn test_dialect_recognised_in_text() {
        let tree = parse_markdown("see [[Foo|foo.bar]] #tag");
        assert_eq!(types(&tree.children[0]), ["text", "wikiLink", "text", "hashtag"]);
    }

    #[test]
    fn test_hard_break_and_positions() {
        let tree = parse_markdown("a  \nb");
        let para = &tree.children[0];
        assert_eq!(types(para), ["text", "break", "text"]);
        assert_eq!(para.children[0].position, Some(Position::new(0, 1)));
    }
}
