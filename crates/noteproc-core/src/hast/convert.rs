/*
 * convert.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Source tree to rendering tree conversion.
 */

//! Source tree to rendering tree conversion.
//!
//! Every node kind is handled by one arm of [`Converter::one`]. Nodes
//! carrying [`RenderHints`](noteproc_ast::RenderHints) are adjusted by
//! [`augment`] after their default conversion: the hinted name replaces the
//! element name, hinted properties are merged over the defaults and hinted
//! children replace the converted children.

use noteproc_ast::{Node, NodeKind, PropValue, Properties, properties};
use once_cell::sync::Lazy;
use regex::Regex;

use super::table::lower_table;
use crate::{ProcError, Result};

static LINE_ENDING_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*\n+[ \t]*").expect("line ending pattern is valid"));

static LEADING_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+").expect("leading space pattern is valid"));

/// Convert a source tree into a rendering tree.
pub fn to_hast(tree: &Node) -> Result<Node> {
    Converter::new().convert(tree)
}

/// Remove spaces and tabs around line endings.
pub fn trim_lines(value: &str) -> String {
    LINE_ENDING_SPACE.replace_all(value, "\n").into_owned()
}

/// Join `nodes` with line feed text nodes.
///
/// A loose group also gets a line feed before the first and after the last
/// node. An empty group produces nothing.
pub fn wrap(nodes: Vec<Node>, loose: bool) -> Vec<Node> {
    if nodes.is_empty() {
        return nodes;
    }
    let mut result = Vec::with_capacity(nodes.len() * 2 + 1);
    if loose {
        result.push(Node::text("\n"));
    }
    for (index, node) in nodes.into_iter().enumerate() {
        if index > 0 {
            result.push(Node::text("\n"));
        }
        result.push(node);
    }
    if loose {
        result.push(Node::text("\n"));
    }
    result
}

/// Apply the render hints of source node `node` to its conversion `result`.
pub fn augment(node: &Node, mut result: Node) -> Node {
    if let Some(hints) = &node.data.hints {
        if let Some(name) = &hints.name {
            match &mut result.kind {
                NodeKind::Element { tag_name, .. } => *tag_name = name.clone(),
                _ => result = Node::element(name.clone(), Properties::new(), Vec::new()),
            }
        }
        if let Some(props) = result.properties_mut() {
            for (key, value) in &hints.properties {
                props.replace(key.clone(), value.clone());
            }
        }
        if let Some(children) = &hints.children
            && result.tag_name().is_some()
        {
            result.children = children.clone();
        }
    }
    if result.position.is_none() {
        result.position = node.position;
    }
    result
}

/// Conversion state for one tree.
#[derive(Debug, Default)]
pub struct Converter {
    /// Footnote labels in order of first reference
    footnote_refs: Vec<String>,
    /// Converted footnote definitions in document order
    footnote_defs: Vec<(String, Vec<Node>)>,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a whole tree; footnote definitions are collected at the end.
    pub fn convert(mut self, tree: &Node) -> Result<Node> {
        let mut out = self.one(tree)?;
        let mut root = match out.len() {
            1 if matches!(out[0].kind, NodeKind::Root) => out.remove(0),
            _ => Node::root(wrap(out, false)).with_position(tree.position),
        };
        if let Some(footer) = self.footer() {
            root.children.push(Node::text("\n"));
            root.children.push(footer);
        }
        Ok(root)
    }

    /// Build element `tag_name` for `node`, applying the node's hints.
    pub fn element(
        &self,
        node: &Node,
        tag_name: &str,
        props: Properties,
        children: Vec<Node>,
    ) -> Node {
        augment(node, Node::element(tag_name, props, children))
    }

    /// Convert every child of `parent`.
    ///
    /// Leading whitespace is stripped from the first node converted from a
    /// child that directly follows a `break`.
    pub fn all(&mut self, parent: &Node) -> Result<Vec<Node>> {
        let mut values = Vec::new();
        for (index, child) in parent.children.iter().enumerate() {
            let mut result = self.one(child)?;
            let after_break = index > 0
                && matches!(parent.children[index - 1].kind, NodeKind::Break);
            if after_break && let Some(first) = result.first_mut() {
                strip_leading_whitespace(first);
            }
            values.extend(result);
        }
        Ok(values)
    }

    /// Convert one node.
    pub fn one(&mut self, node: &Node) -> Result<Vec<Node>> {
        let out = match &node.kind {
            NodeKind::Root => {
                let children = wrap(self.all(node)?, false);
                augment(node, Node::root(children))
            }
            NodeKind::Paragraph => {
                let children = self.all(node)?;
                self.element(node, "p", Properties::new(), children)
            }
            NodeKind::Heading { depth } => {
                let children = self.all(node)?;
                self.element(node, &format!("h{depth}"), Properties::new(), children)
            }
            NodeKind::ThematicBreak => self.element(node, "hr", Properties::new(), Vec::new()),
            NodeKind::Blockquote => {
                let children = wrap(self.all(node)?, true);
                self.element(node, "blockquote", Properties::new(), children)
            }
            NodeKind::List { ordered, start } => {
                let mut props = Properties::new();
                if *ordered && let Some(start) = start.filter(|s| *s != 1) {
                    props.insert("start".into(), start.to_string().into());
                }
                let tag = if *ordered { "ol" } else { "ul" };
                let children = wrap(self.all(node)?, true);
                self.element(node, tag, props, children)
            }
            NodeKind::ListItem { checked } => self.list_item(node, *checked)?,
            NodeKind::Html { value } => augment(node, Node::new(NodeKind::Raw { value: value.clone() })),
            NodeKind::Code { lang, value, .. } => {
                let mut props = Properties::new();
                if let Some(lang) = lang {
                    props.insert("class".into(), vec![format!("language-{lang}")].into());
                }
                let code = Node::element("code", props, vec![Node::text(format!("{value}\n"))])
                    .with_position(node.position);
                self.element(node, "pre", Properties::new(), vec![code])
            }
            NodeKind::Yaml { .. } => return Ok(Vec::new()),
            NodeKind::Math { value } => self.element(
                node,
                "div",
                properties([("class", vec!["math".to_string(), "math-display".to_string()])]),
                vec![Node::text(value.clone())],
            ),
            NodeKind::InlineMath { value } => self.element(
                node,
                "span",
                properties([("class", vec!["math".to_string(), "math-inline".to_string()])]),
                vec![Node::text(value.clone())],
            ),
            NodeKind::Table { .. } => lower_table(self, node)?,
            NodeKind::TableRow => {
                let children = wrap(self.all(node)?, true);
                self.element(node, "tr", Properties::new(), children)
            }
            NodeKind::TableCell => {
                let children = self.all(node)?;
                self.element(node, "td", Properties::new(), children)
            }
            NodeKind::FootnoteDefinition { label } => {
                let children = self.all(node)?;
                self.footnote_defs.push((label.clone(), children));
                return Ok(Vec::new());
            }
            NodeKind::Text { value } => augment(node, Node::text(trim_lines(value))),
            NodeKind::Emphasis => {
                let children = self.all(node)?;
                self.element(node, "em", Properties::new(), children)
            }
            NodeKind::Strong => {
                let children = self.all(node)?;
                self.element(node, "strong", Properties::new(), children)
            }
            NodeKind::Delete => {
                let children = self.all(node)?;
                self.element(node, "del", Properties::new(), children)
            }
            NodeKind::InlineCode { value } => self.element(
                node,
                "code",
                Properties::new(),
                vec![Node::text(value.clone())],
            ),
            NodeKind::Break => {
                let br = self.element(node, "br", Properties::new(), Vec::new());
                return Ok(vec![br, Node::text("\n")]);
            }
            NodeKind::Link { url, title } => {
                let mut props = properties([("href", url.as_str())]);
                if let Some(title) = title {
                    props.insert("title".into(), title.clone().into());
                }
                let children = self.all(node)?;
                self.element(node, "a", props, children)
            }
            NodeKind::Image { url, alt, title } => {
                let mut props = properties([("src", url.as_str()), ("alt", alt.as_str())]);
                if let Some(title) = title {
                    props.insert("title".into(), title.clone().into());
                }
                self.element(node, "img", props, Vec::new())
            }
            NodeKind::FootnoteReference { label } => self.footnote_reference(node, label),
            NodeKind::WikiLink {
                value,
                alias,
                anchor,
            } => {
                let alias = alias.as_ref().map(|a| format!("{a}|")).unwrap_or_default();
                let anchor = anchor.as_ref().map(|a| format!("#{a}")).unwrap_or_default();
                augment(node, Node::text(format!("[[{alias}{value}{anchor}]]")))
            }
            NodeKind::NoteRef { value, anchor } => {
                let anchor = anchor.as_ref().map(|a| format!("#{a}")).unwrap_or_default();
                augment(node, Node::text(format!("![[{value}{anchor}]]")))
            }
            NodeKind::Hashtag { value } => augment(node, Node::text(format!("#{value}"))),
            NodeKind::UserTag { value } => augment(node, Node::text(format!("@{value}"))),
            NodeKind::BlockAnchor { id } => augment(node, Node::text(format!("^{id}"))),
            NodeKind::Abbr { abbr, reference } => self.element(
                node,
                "abbr",
                properties([("title", reference.as_str())]),
                vec![Node::text(abbr.clone())],
            ),
            NodeKind::Element { .. } => {
                let children = self.all(node)?;
                Node {
                    kind: node.kind.clone(),
                    children,
                    position: node.position,
                    data: Default::default(),
                }
            }
            NodeKind::Raw { .. } | NodeKind::Comment { .. } => node.clone(),
            NodeKind::Unknown { .. } => self.unknown(node)?,
        };
        Ok(vec![out])
    }

    /// Fallback for kinds without a dedicated handler.
    ///
    /// Plain text nodes become text, anything else becomes a `div` around
    /// its converted children.
    pub fn unknown(&mut self, node: &Node) -> Result<Node> {
        if node.type_name().is_empty() {
            return Err(ProcError::UnknownNode(
                node.value().unwrap_or("undefined").to_string(),
            ));
        }
        if node.is_plain_text() {
            let value = node.value().unwrap_or_default();
            return Ok(augment(node, Node::text(value)));
        }
        let children = self.all(node)?;
        Ok(self.element(node, "div", Properties::new(), children))
    }

    fn list_item(&mut self, node: &Node, checked: Option<bool>) -> Result<Node> {
        let loose = node
            .children
            .iter()
            .any(|c| matches!(c.kind, NodeKind::Paragraph));
        let mut children = self.all(node)?;
        let mut props = Properties::new();
        if let Some(checked) = checked {
            props.insert("class".into(), vec!["task-list-item".to_string()].into());
            let input = Node::element(
                "input",
                properties([
                    ("type", PropValue::from("checkbox")),
                    ("checked", PropValue::from(checked)),
                    ("disabled", PropValue::from(true)),
                ]),
                Vec::new(),
            );
            children.insert(0, Node::text(" "));
            children.insert(0, input);
        }
        let children = if loose { wrap(children, true) } else { children };
        Ok(self.element(node, "li", props, children))
    }

    fn footnote_reference(&mut self, node: &Node, label: &str) -> Node {
        let number = match self.footnote_refs.iter().position(|l| l == label) {
            Some(index) => index + 1,
            None => {
                self.footnote_refs.push(label.to_string());
                self.footnote_refs.len()
            }
        };
        let link = Node::element(
            "a",
            properties([
                ("href", format!("#fn-{label}")),
                ("id", format!("fnref-{label}")),
                ("class", "footnote-ref".to_string()),
            ]),
            vec![Node::text(number.to_string())],
        );
        self.element(node, "sup", Properties::new(), vec![link])
    }

    /// The footnote section, in order of first reference.
    fn footer(&mut self) -> Option<Node> {
        if self.footnote_defs.is_empty() {
            return None;
        }
        let mut defs = std::mem::take(&mut self.footnote_defs);
        defs.sort_by_key(|(label, _)| {
            self.footnote_refs
                .iter()
                .position(|l| l == label)
                .unwrap_or(usize::MAX)
        });
        let items = defs
            .into_iter()
            .map(|(label, mut children)| {
                children.push(Node::text(" "));
                children.push(Node::element(
                    "a",
                    properties([
                        ("href", format!("#fnref-{label}")),
                        ("class", "footnote-backref".to_string()),
                    ]),
                    vec![Node::text("↩")],
                ));
                Node::element("li", properties([("id", format!("fn-{label}"))]), children)
            })
            .collect();
        let list = Node::element("ol", Properties::new(), wrap(items, true));
        Some(Node::element(
            "div",
            properties([("class", "footnotes")]),
            wrap(
                vec![Node::element("hr", Properties::new(), Vec::new()), list],
                true,
            ),
        ))
    }
}

fn strip_leading_whitespace(node: &mut Node) {
    if let NodeKind::Text { value } = &mut node.kind {
        *value = LEADING_SPACE.replace(value, "").into_owned();
    }
    if let Some(NodeKind::Text { value }) = node.children.first_mut().map(|c| &mut c.kind) {
        *value = LEADING_SPACE.replace(value, "").into_owned();
    }
}
