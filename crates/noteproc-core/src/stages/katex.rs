/*
 * katex.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Math elements to MathML-annotated markup.
 */

use noteproc_ast::{Node, PropValue, Properties, properties};

use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// Renders `.math-inline` and `.math-display` elements.
///
/// The element keeps its classes; its content becomes the `span.katex`
/// structure with the TeX source preserved in an `application/x-tex`
/// annotation, which client-side scripts typeset. Display math is further
/// wrapped in `span.katex-display`.
pub struct Katex;

impl Stage for Katex {
    fn name(&self) -> &str {
        "katex"
    }

    fn transform(&self, tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
        tree.walk_mut(&mut |node| {
            let display = if has_class(node, "math-display") {
                true
            } else if has_class(node, "math-inline") {
                false
            } else {
                return;
            };
            let tex = node.to_plain_text();
            let rendered = katex(&tex, display);
            node.children = if display {
                vec![Node::element(
                    "span",
                    properties([("class", vec!["katex-display".to_string()])]),
                    vec![rendered],
                )]
            } else {
                vec![rendered]
            };
        });
        Ok(())
    }
}

fn has_class(node: &Node, class: &str) -> bool {
    match node.properties().and_then(|p| p.get("class")) {
        Some(PropValue::List(items)) => items.iter().any(|c| c == class),
        Some(PropValue::String(s)) => s.split_whitespace().any(|c| c == class),
        _ => false,
    }
}

fn katex(tex: &str, display: bool) -> Node {
    let annotation = Node::element(
        "annotation",
        properties([("encoding", "application/x-tex")]),
        vec![Node::text(tex)],
    );
    let semantics = Node::element("semantics", Properties::new(), vec![annotation]);
    let mut math_props = properties([("xmlns", MATHML_NS)]);
    if display {
        math_props.insert("display".into(), "block".into());
    }
    let math = Node::element("math", math_props, vec![semantics]);
    Node::element(
        "span",
        properties([("class", vec!["katex".to_string()])]),
        vec![math],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hast::{to_hast, to_html};
    use crate::options::{ProcMode, ProcOptions};
    use crate::parse::parse_markdown;
    use crate::stages::Math;
    use insta::assert_snapshot;

    fn render(source: &str) -> String {
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::NoData));
        let mut tree = parse_markdown(source);
        Math.transform(&mut tree, &mut ctx).unwrap();
        let mut tree = to_hast(&tree).unwrap();
        Katex.transform(&mut tree, &mut ctx).unwrap();
        to_html(&tree)
    }

    #[test]
    fn test_inline() {
        assert_snapshot!(
            render("$x<1$"),
            @r#"<p><span class="math math-inline"><span class="katex"><math xmlns="http://www.w3.org/1998/Math/MathML"><semantics><annotation encoding="application/x-tex">x&lt;1</annotation></semantics></math></span></span></p>"#
        );
    }

    #[test]
    fn test_display_is_wrapped() {
        let html = render("$$\nx\n$$");
        assert!(html.starts_with(concat!(
            r#"<div class="math math-display"><span class="katex-display"><span class="katex">"#,
            r#"<math xmlns="http://www.w3.org/1998/Math/MathML" display="block">"#
        )));
    }
}
