/*
 * syntax.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Lexical recognition of the note dialect inside text nodes.
 */

//! Dialect tokenisation.
//!
//! The CommonMark parser leaves the note extensions in plain text. This
//! module splits text nodes into wiki links (`[[alias|target#anchor]]`),
//! note references (`![[target#anchor]]`), hashtags, user tags and block
//! anchors. Text inside links is left alone.

use noteproc_ast::{Node, NodeKind, Position};
use once_cell::sync::Lazy;
use regex::Regex;

static DIALECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?m)",
        r"(?P<noteref>!\[\[(?P<nr>[^\[\]\n]+?)\]\])",
        r"|(?P<wiki>\[\[(?P<wl>[^\[\]\n]+?)\]\])",
        r"|(?P<hpre>^|[\s(])#(?P<tag>[A-Za-z][\w-]*(?:\.[\w-]+)*)",
        r"|(?P<upre>^|[\s(])@(?P<user>[A-Za-z][\w-]*(?:\.[\w-]+)*)",
        r"|(?P<bpre>^|[ \t])\^(?P<anchor>[A-Za-z0-9_-]+)$",
    ))
    .expect("dialect pattern is valid")
});

/// A parsed `[[...]]` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub value: String,
    pub alias: Option<String>,
    pub anchor: Option<String>,
}

/// Split `alias|target#anchor` into its parts.
pub fn parse_link_target(body: &str) -> LinkTarget {
    let (alias, rest) = match body.split_once('|') {
        Some((alias, rest)) => (Some(alias.trim().to_string()), rest),
        None => (None, body),
    };
    let (value, anchor) = match rest.split_once('#') {
        Some((value, anchor)) => (value, Some(anchor.trim().to_string())),
        None => (rest, None),
    };
    LinkTarget {
        value: value.trim().to_string(),
        alias: alias.filter(|a| !a.is_empty()),
        anchor: anchor.filter(|a| !a.is_empty()),
    }
}

/// Recognise dialect tokens in every text node of `tree`.
pub fn tokenize_tree(tree: &mut Node) {
    if matches!(tree.kind, NodeKind::Link { .. }) {
        return;
    }
    let children = std::mem::take(&mut tree.children);
    let mut out = Vec::with_capacity(children.len());
    for mut child in children {
        match &child.kind {
            NodeKind::Text { value } if child.data.is_empty() => {
                out.extend(tokenize_text(value, child.position));
            }
            _ => {
                tokenize_tree(&mut child);
                out.push(child);
            }
        }
    }
    tree.children = out;
}

/// Split one text value into text and dialect nodes.
///
/// Positions are only assigned when the text is a verbatim slice of the
/// source, which is the case unless escapes or entities were decoded.
pub fn tokenize_text(value: &str, position: Option<Position>) -> Vec<Node> {
    let base = position
        .filter(|p| p.len() == value.len())
        .map(|p| p.start);
    let span = |start: usize, end: usize| base.map(|b| Position::new(b + start, b + end));

    let mut nodes = Vec::new();
    let mut last = 0;
    for caps in DIALECT.captures_iter(value) {
        let Some(whole) = caps.get(0) else { continue };
        let mut start = whole.start();
        let prefix = ["hpre", "upre", "bpre"]
            .iter()
            .find_map(|name| caps.name(name))
            .map(|m| m.len())
            .unwrap_or(0);
        start += prefix;

        let kind = if let Some(body) = caps.name("nr") {
            let target = parse_link_target(body.as_str());
            NodeKind::NoteRef {
                value: target.value,
                anchor: target.anchor,
            }
        } else if let Some(body) = caps.name("wl") {
            let target = parse_link_target(body.as_str());
            NodeKind::WikiLink {
                value: target.value,
                alias: target.alias,
                anchor: target.anchor,
            }
        } else if let Some(tag) = caps.name("tag") {
            NodeKind::Hashtag {
                value: tag.as_str().to_string(),
            }
        } else if let Some(user) = caps.name("user") {
            NodeKind::UserTag {
                value: user.as_str().to_string(),
            }
        } else if let Some(anchor) = caps.name("anchor") {
            NodeKind::BlockAnchor {
                id: anchor.as_str().to_string(),
            }
        } else {
            continue;
        };

        if start > last {
            nodes.push(Node::text(&value[last..start]).with_position(span(last, start)));
        }
        nodes.push(Node::new(kind).with_position(span(start, whole.end())));
        last = whole.end();
    }
    if last < value.len() || nodes.is_empty() {
        nodes.push(Node::text(&value[last..]).with_position(span(last, value.len())));
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(Node::type_name).collect()
    }

    #[test]
    fn test_parse_link_target() {
        assert_eq!(
            parse_link_target("Foo|bar.baz#intro"),
            LinkTarget {
                value: "bar.baz".into(),
                alias: Some("Foo".into()),
                anchor: Some("intro".into()),
            }
        );
        assert_eq!(parse_link_target("bar").alias, None);
        assert_eq!(parse_link_target("bar#^blk").anchor.as_deref(), Some("^blk"));
    }

    #[test]
    fn test_wiki_link_and_note_ref() {
        let nodes = tokenize_text("see [[foo]] and ![[bar#sec]]", None);
        assert_eq!(kinds(&nodes), ["text", "wikiLink", "text", "noteRef"]);
        assert_eq!(
            nodes[3].kind,
            NodeKind::NoteRef {
                value: "bar".into(),
                anchor: Some("sec".into())
            }
        );
    }

    #[test]
    fn test_tags_require_boundary() {
        let nodes = tokenize_text("a #tag.sub and mail@example.com", None);
        assert_eq!(kinds(&nodes), ["text", "hashtag", "text"]);
        assert_eq!(nodes[0].value(), Some("a "));
        assert_eq!(nodes[2].value(), Some(" and mail@example.com"));

        assert_eq!(kinds(&tokenize_text("#1 issue", None)), ["text"]);
        assert_eq!(kinds(&tokenize_text("(@alice)", None)), ["text", "userTag", "text"]);
    }

    #[test]
    fn test_block_anchor_at_line_end() {
        let nodes = tokenize_text("a paragraph ^abc", None);
        assert_eq!(kinds(&nodes), ["text", "blockAnchor"]);
        assert_eq!(kinds(&tokenize_text("x ^abc y", None)), ["text"]);
    }

    #[test]
    fn test_positions_follow_source() {
        let nodes = tokenize_text("x [[y]]", Some(Position::new(10, 17)));
        assert_eq!(nodes[1].position, Some(Position::new(12, 17)));
    }

    #[test]
    fn test_links_are_not_tokenized() {
        let mut tree = Node::root(vec![
            Node::new(NodeKind::Link {
                url: "x".into(),
                title: None,
            })
            .with_children(vec![Node::text("#tag")]),
        ]);
        tokenize_tree(&mut tree);
        assert_eq!(tree.children[0].children[0].type_name(), "text");
    }
}
