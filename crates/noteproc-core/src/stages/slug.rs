/*
 * slug.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::collections::HashMap;

use noteproc_ast::{Node, PropValue};

use super::slugify;
use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Gives every heading element a unique, GitHub-style `id`.
///
/// Repeated slugs get `-1`, `-2`, ... suffixes. Headings that already have
/// an id keep it.
pub struct Slug;

impl Stage for Slug {
    fn name(&self) -> &str {
        "slug"
    }

    fn transform(&self, tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
        let mut slugger = Slugger::default();
        tree.walk_mut(&mut |node| {
            if !node.tag_name().is_some_and(|t| HEADINGS.contains(&t)) {
                return;
            }
            let text = node.to_plain_text();
            if let Some(props) = node.properties_mut()
                && !props.contains_key("id")
            {
                props.insert("id".into(), PropValue::String(slugger.slug(&text)));
            }
        });
        Ok(())
    }
}

/// Slug generator that never hands out the same slug twice.
#[derive(Debug, Default)]
struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    fn slug(&mut self, text: &str) -> String {
        let original = slugify(text);
        let mut slug = original.clone();
        while self.occurrences.contains_key(&slug) {
            let count = self.occurrences.entry(original.clone()).or_insert(0);
            *count += 1;
            slug = format!("{original}-{count}");
        }
        self.occurrences.insert(slug.clone(), 0);
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hast::{to_hast, to_html};
    use crate::options::{ProcMode, ProcOptions};
    use crate::parse::parse_markdown;
    use insta::assert_snapshot;

    #[test]
    fn test_unique_ids() {
        let mut tree = to_hast(&parse_markdown("# Intro\n\n## Intro\n\n### Hello, World!")).unwrap();
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::NoData));
        Slug.transform(&mut tree, &mut ctx).unwrap();
        assert_snapshot!(
            to_html(&tree).replace('\n', ""),
            @r#"<h1 id="intro">Intro</h1><h2 id="intro-1">Intro</h2><h3 id="hello-world">Hello, World!</h3>"#
        );
    }

    #[test]
    fn test_slugger_skips_taken_suffixes() {
        let mut slugger = Slugger::default();
        assert_eq!(slugger.slug("a-1"), "a-1");
        assert_eq!(slugger.slug("a"), "a");
        assert_eq!(slugger.slug("a"), "a-2");
    }
}
