/*
 * variables.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Frontmatter variable substitution.
 */

use noteproc_ast::Node;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use super::rewrite_text;
use crate::Result;
use crate::context::ProcContext;
use crate::diagnostic::DiagnosticMessage;
use crate::stage::Stage;

static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*fm\.(?P<key>[\w.-]+)\s*\}\}").expect("variable pattern is valid")
});

/// Replaces `{{ fm.key }}` in text with the frontmatter value of `key`.
///
/// Dotted keys walk into nested mappings. Unknown keys are left in place
/// and reported.
pub struct Variables;

impl Stage for Variables {
    fn name(&self) -> &str {
        "variables"
    }

    fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
        let Some(fm) = ctx.fm.clone() else {
            return Ok(());
        };
        let mut unknown = Vec::new();
        rewrite_text(tree, &mut |value, position| {
            if !VARIABLE.is_match(value) {
                return None;
            }
            let replaced = VARIABLE.replace_all(value, |caps: &Captures| {
                let key = &caps["key"];
                match lookup(&fm, key) {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => {
                        unknown.push((key.to_string(), position));
                        caps[0].to_string()
                    }
                }
            });
            Some(vec![Node::text(replaced).with_position(position)])
        });
        for (key, position) in unknown {
            ctx.add_diagnostic(
                DiagnosticMessage::warning(format!("frontmatter variable `{key}` is not defined"))
                    .with_stage(self.name())
                    .with_position(position),
            );
        }
        Ok(())
    }
}

fn lookup<'a>(fm: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = fm.get(key) {
        return Some(value);
    }
    let mut parts = key.split('.');
    let mut current = fm.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}
