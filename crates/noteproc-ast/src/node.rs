/*
 * node.rs
 * Copyright (c) 2025 Posit, PBC
 */

use serde::{Deserialize, Serialize};

use crate::data::{NodeData, Properties};
use crate::position::Position;

/// Column alignment of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Align {
    /// Value of the `align` attribute, if any.
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            Align::None => None,
            Align::Left => Some("left"),
            Align::Center => Some("center"),
            Align::Right => Some("right"),
        }
    }
}

/// The kind of a node, with the fields specific to that kind.
///
/// The first group mirrors the parsed source dialect, the second group
/// (`Element`, `Raw`, `Comment`) only appears in rendering trees.
/// `Unknown` carries kinds that external stages introduce; conversion to
/// the rendering tree falls back to generic handling for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading {
        depth: u8,
    },
    ThematicBreak,
    Blockquote,
    List {
        ordered: bool,
        start: Option<u64>,
    },
    ListItem {
        checked: Option<bool>,
    },
    Html {
        value: String,
    },
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
    },
    Yaml {
        value: String,
    },
    Math {
        value: String,
    },
    Table {
        align: Vec<Align>,
    },
    TableRow,
    TableCell,
    FootnoteDefinition {
        label: String,
    },

    Text {
        value: String,
    },
    Emphasis,
    Strong,
    Delete,
    InlineCode {
        value: String,
    },
    InlineMath {
        value: String,
    },
    Break,
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    FootnoteReference {
        label: String,
    },
    WikiLink {
        value: String,
        alias: Option<String>,
        anchor: Option<String>,
    },
    NoteRef {
        value: String,
        anchor: Option<String>,
    },
    Hashtag {
        value: String,
    },
    UserTag {
        value: String,
    },
    BlockAnchor {
        id: String,
    },
    Abbr {
        abbr: String,
        reference: String,
    },

    Element {
        tag_name: String,
        properties: Properties,
    },
    Raw {
        value: String,
    },
    Comment {
        value: String,
    },

    Unknown {
        type_name: String,
        value: Option<String>,
    },
}

impl NodeKind {
    /// The `type` tag of this kind, as it appears in serialized trees.
    pub fn type_name(&self) -> &str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::ThematicBreak => "thematicBreak",
            NodeKind::Blockquote => "blockquote",
            NodeKind::List { .. } => "list",
            NodeKind::ListItem { .. } => "listItem",
            NodeKind::Html { .. } => "html",
            NodeKind::Code { .. } => "code",
            NodeKind::Yaml { .. } => "yaml",
            NodeKind::Math { .. } => "math",
            NodeKind::Table { .. } => "table",
            NodeKind::TableRow => "tableRow",
            NodeKind::TableCell => "tableCell",
            NodeKind::FootnoteDefinition { .. } => "footnoteDefinition",
            NodeKind::Text { .. } => "text",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Strong => "strong",
            NodeKind::Delete => "delete",
            NodeKind::InlineCode { .. } => "inlineCode",
            NodeKind::InlineMath { .. } => "inlineMath",
            NodeKind::Break => "break",
            NodeKind::Link { .. } => "link",
            NodeKind::Image { .. } => "image",
            NodeKind::FootnoteReference { .. } => "footnoteReference",
            NodeKind::WikiLink { .. } => "wikiLink",
            NodeKind::NoteRef { .. } => "noteRef",
            NodeKind::Hashtag { .. } => "hashtag",
            NodeKind::UserTag { .. } => "userTag",
            NodeKind::BlockAnchor { .. } => "blockAnchor",
            NodeKind::Abbr { .. } => "abbr",
            NodeKind::Element { .. } => "element",
            NodeKind::Raw { .. } => "raw",
            NodeKind::Comment { .. } => "comment",
            NodeKind::Unknown { type_name, .. } => type_name,
        }
    }

    /// The literal value of kinds that carry one.
    pub fn value(&self) -> Option<&str> {
        match self {
            NodeKind::Text { value }
            | NodeKind::Html { value }
            | NodeKind::Code { value, .. }
            | NodeKind::Yaml { value }
            | NodeKind::Math { value }
            | NodeKind::InlineCode { value }
            | NodeKind::InlineMath { value }
            | NodeKind::Raw { value }
            | NodeKind::Comment { value } => Some(value),
            NodeKind::Unknown { value, .. } => value.as_deref(),
            _ => None,
        }
    }

    fn value_mut(&mut self) -> Option<&mut String> {
        match self {
            NodeKind::Text { value }
            | NodeKind::Html { value }
            | NodeKind::Code { value, .. }
            | NodeKind::Yaml { value }
            | NodeKind::Math { value }
            | NodeKind::InlineCode { value }
            | NodeKind::InlineMath { value }
            | NodeKind::Raw { value }
            | NodeKind::Comment { value } => Some(value),
            NodeKind::Unknown { value, .. } => value.as_mut(),
            _ => None,
        }
    }
}

/// A syntax tree node. Each node exclusively owns its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "NodeData::is_empty")]
    pub data: NodeData,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            position: None,
            data: NodeData::default(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_position(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }

    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    pub fn root(children: Vec<Node>) -> Self {
        Node::new(NodeKind::Root).with_children(children)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Node::new(NodeKind::Text {
            value: value.into(),
        })
    }

    pub fn element(tag_name: impl Into<String>, properties: Properties, children: Vec<Node>) -> Self {
        Node::new(NodeKind::Element {
            tag_name: tag_name.into(),
            properties,
        })
        .with_children(children)
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    pub fn value(&self) -> Option<&str> {
        self.kind.value()
    }

    pub fn value_mut(&mut self) -> Option<&mut String> {
        self.kind.value_mut()
    }

    /// Whether this node should be rendered as a plain text node: it has a
    /// literal value and no rendering hints.
    pub fn is_plain_text(&self) -> bool {
        !self.data.has_hints() && self.value().is_some()
    }

    /// Element tag name for rendering-tree elements.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag_name, .. } => Some(tag_name),
            _ => None,
        }
    }

    pub fn properties(&self) -> Option<&Properties> {
        match &self.kind {
            NodeKind::Element { properties, .. } => Some(properties),
            _ => None,
        }
    }

    pub fn properties_mut(&mut self) -> Option<&mut Properties> {
        match &mut self.kind {
            NodeKind::Element { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Concatenated text content of this node and its descendants.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Image { alt, .. } => out.push_str(alt),
            NodeKind::WikiLink { value, alias, .. } => {
                out.push_str(alias.as_deref().unwrap_or(value))
            }
            kind => {
                if let Some(value) = kind.value() {
                    out.push_str(value);
                }
            }
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Visit this node and every descendant in document order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Mutable pre-order traversal.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    /// Replace every descendant with the nodes `f` returns for it.
    ///
    /// Descendants are processed bottom-up, so `f` sees children that have
    /// already been rewritten.
    pub fn flat_map_descendants(&mut self, f: &mut impl FnMut(Node) -> Vec<Node>) {
        let children = std::mem::take(&mut self.children);
        let mut rewritten = Vec::with_capacity(children.len());
        for mut child in children {
            child.flat_map_descendants(f);
            rewritten.extend(f(child));
        }
        self.children = rewritten;
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}
