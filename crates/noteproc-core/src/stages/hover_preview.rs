/*
 * hover_preview.rs
 * Copyright (c) 2025 Posit, PBC
 */

use noteproc_ast::{Node, NodeKind};

use crate::Result;
use crate::context::ProcContext;
use crate::stage::Stage;

/// Makes relative image paths absolute for hover previews.
///
/// Hover previews are rendered outside the note's directory, so an image
/// at `assets/cat.png` is rewritten to `<wsRoot>/<vault>/assets/cat.png`.
pub struct HoverPreview;

impl Stage for HoverPreview {
    fn name(&self) -> &str {
        "hover-preview"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        let (Some(ws_root), Some(vault)) = (&ctx.ws_root, &ctx.vault) else {
            return Ok(());
        };
        let base = ws_root.join(&vault.fs_path);
        tree.walk_mut(&mut |node| {
            if let NodeKind::Image { url, .. } = &mut node.kind
                && is_relative(url)
            {
                *url = base.join(url.as_str()).to_string_lossy().into_owned();
            }
        });
        Ok(())
    }
}

fn is_relative(url: &str) -> bool {
    !(url.is_empty() || url.starts_with('/') || url.starts_with('#') || url.contains(':'))
}
