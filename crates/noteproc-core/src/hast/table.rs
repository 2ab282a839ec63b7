/*
 * table.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Lowering of table nodes into rendering-tree tables.
 */

use noteproc_ast::{Node, NodeKind, Position, Properties};

use super::convert::{Converter, wrap};
use crate::{ProcError, Result};

/// Lower a `table` node into a `table` element with `thead` and `tbody`.
///
/// The alignment list decides the column count: extra cells in a row are
/// dropped and missing cells are emitted empty. Row 0 is always the header
/// row; every other row goes into `tbody`, which is emitted even when empty.
pub fn lower_table(h: &mut Converter, node: &Node) -> Result<Node> {
    let NodeKind::Table { align } = &node.kind else {
        return Err(ProcError::other(format!(
            "table lowering expects a table, got `{}`",
            node.type_name()
        )));
    };

    let mut rows = Vec::with_capacity(node.children.len());
    for (index, row) in node.children.iter().enumerate() {
        let name = if index == 0 { "th" } else { "td" };
        let mut cells = Vec::with_capacity(align.len());
        for (column, column_align) in align.iter().enumerate() {
            let mut props = Properties::new();
            if let Some(value) = column_align.as_attr() {
                props.insert("align".into(), value.into());
            }
            let cell = match row.children.get(column) {
                Some(cell) => {
                    let children = h.all(cell)?;
                    h.element(cell, name, props, children)
                }
                None => Node::element(name, props, Vec::new()),
            };
            cells.push(cell);
        }
        rows.push(h.element(row, "tr", Properties::new(), wrap(cells, true)));
    }

    let mut rows = rows.into_iter();
    let mut sections = Vec::with_capacity(2);
    if let Some(head) = rows.next() {
        let position = head.position;
        sections.push(
            Node::element("thead", Properties::new(), wrap(vec![head], true))
                .with_position(position),
        );
    }
    let body: Vec<Node> = rows.collect();
    let position = Position::between(
        body.first().and_then(|r| r.position.as_ref()),
        body.last().and_then(|r| r.position.as_ref()),
    );
    sections.push(
        Node::element("tbody", Properties::new(), wrap(body, true)).with_position(position),
    );

    Ok(h.element(node, "table", Properties::new(), wrap(sections, true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use noteproc_ast::{Align, PropValue};
    use pretty_assertions::assert_eq;

    fn cell(text: &str) -> Node {
        Node::new(NodeKind::TableCell).with_children(vec![Node::text(text)])
    }

    fn row(cells: &[&str]) -> Node {
        Node::new(NodeKind::TableRow).with_children(cells.iter().map(|c| cell(c)).collect())
    }

    fn table(align: Vec<Align>, rows: Vec<Node>) -> Node {
        Node::new(NodeKind::Table { align }).with_children(rows)
    }

    fn elements(node: &Node) -> Vec<&Node> {
        node.children.iter().filter(|c| c.tag_name().is_some()).collect()
    }

    fn lower(node: &Node) -> Node {
        lower_table(&mut Converter::new(), node).unwrap()
    }

    #[test]
    fn test_sections() {
        let out = lower(&table(
            vec![Align::None, Align::None],
            vec![row(&["a", "b"]), row(&["1", "2"]), row(&["3", "4"])],
        ));
        let sections = elements(&out);
        assert_eq!(sections[0].tag_name(), Some("thead"));
        assert_eq!(sections[1].tag_name(), Some("tbody"));
        assert_eq!(elements(sections[0]).len(), 1);
        let body_rows = elements(sections[1]);
        assert_eq!(body_rows.len(), 2);
        assert_eq!(body_rows[0].to_plain_text().trim(), "1\n2");
        assert_eq!(body_rows[1].to_plain_text().trim(), "3\n4");
    }

    #[test]
    fn test_column_count_from_alignment() {
        let out = lower(&table(
            vec![Align::Left, Align::Right],
            vec![row(&["a", "b", "c"]), row(&["1"])],
        ));
        let sections = elements(&out);
        let head = elements(elements(sections[0])[0]);
        assert_eq!(head.len(), 2);
        assert!(head.iter().all(|c| c.tag_name() == Some("th")));

        let body = elements(elements(sections[1])[0]);
        assert_eq!(body.len(), 2);
        assert!(body[1].children.is_empty());
        assert_eq!(
            body[1].properties().unwrap().get("align"),
            Some(&PropValue::from("right"))
        );
    }

    #[test]
    fn test_no_align_attribute_without_alignment() {
        let out = lower(&table(vec![Align::None], vec![row(&["a"])]));
        let head = elements(elements(elements(&out)[0])[0]);
        assert!(head[0].properties().unwrap().is_empty());
    }

    #[test]
    fn test_header_only_and_empty_tables() {
        let out = lower(&table(vec![Align::None], vec![row(&["a"])]));
        let sections = elements(&out);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].tag_name(), Some("tbody"));
        assert!(sections[1].children.is_empty());
        assert_eq!(
            crate::hast::to_html(&out).replace('\n', ""),
            "<table><thead><tr><th>a</th></tr></thead><tbody></tbody></table>"
        );

        let out = lower(&table(vec![Align::None], Vec::new()));
        let sections = elements(&out);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].tag_name(), Some("tbody"));
    }

    #[test]
    fn test_rejects_other_nodes() {
        assert!(lower_table(&mut Converter::new(), &Node::text("x")).is_err());
    }
}
