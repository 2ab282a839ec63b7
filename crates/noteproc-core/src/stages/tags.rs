/*
 * tags.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Hashtags and user tags.
 */

//! Hashtags and user tags.
//!
//! Both are shorthands for wiki links into a reserved hierarchy: `#foo`
//! links to `tags.foo` and `@bar` links to `user.bar`. The note dialect
//! destination keeps the shorthand as written.

use noteproc_ast::{Node, NodeKind};

use super::renders_links;
use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

pub const TAGS_HIERARCHY: &str = "tags.";
pub const USERS_HIERARCHY: &str = "user.";

/// `#tag` to a wiki link into the tags hierarchy.
pub struct Hashtags;

impl Stage for Hashtags {
    fn name(&self) -> &str {
        "hashtags"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        if !renders_links(ctx) {
            return Ok(());
        }
        tree.walk_mut(&mut |node| {
            if let NodeKind::Hashtag { value } = &node.kind {
                node.kind = NodeKind::WikiLink {
                    value: format!("{TAGS_HIERARCHY}{value}"),
                    alias: Some(format!("#{value}")),
                    anchor: None,
                };
                node.data.hints_mut().properties.insert("class".into(), "color-tag".into());
                node.data.set("tag", true);
            }
        });
        Ok(())
    }
}

/// `@user` to a wiki link into the user hierarchy.
pub struct UserTags;

impl Stage for UserTags {
    fn name(&self) -> &str {
        "user-tags"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        if !renders_links(ctx) {
            return Ok(());
        }
        tree.walk_mut(&mut |node| {
            if let NodeKind::UserTag { value } = &node.kind {
                node.kind = NodeKind::WikiLink {
                    value: format!("{USERS_HIERARCHY}{value}"),
                    alias: Some(format!("@{value}")),
                    anchor: None,
                };
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Destination, ProcMode, ProcOptions};
    use crate::parse::parse_markdown;
    use pretty_assertions::assert_eq;

    fn ctx(dest: Destination) -> ProcContext {
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::NoData));
        ctx.dest = Some(dest);
        ctx
    }

    #[test]
    fn test_tags_become_wiki_links() {
        let mut tree = parse_markdown("#idea by @alice");
        let mut ctx = ctx(Destination::Html);
        Hashtags.transform(&mut tree, &mut ctx).unwrap();
        UserTags.transform(&mut tree, &mut ctx).unwrap();

        let para = &tree.children[0];
        assert_eq!(
            para.children[0].kind,
            NodeKind::WikiLink {
                value: "tags.idea".into(),
                alias: Some("#idea".into()),
                anchor: None,
            }
        );
        assert_eq!(para.children[0].data.get_bool("tag"), Some(true));
        assert_eq!(
            para.children[2].kind,
            NodeKind::WikiLink {
                value: "user.alice".into(),
                alias: Some("@alice".into()),
                anchor: None,
            }
        );
    }

    #[test]
    fn test_note_dialect_keeps_tags() {
        let mut tree = parse_markdown("#idea");
        Hashtags
            .transform(&mut tree, &mut ctx(Destination::MdDendron))
            .unwrap();
        assert_eq!(tree.children[0].children[0].type_name(), "hashtag");
    }
}
