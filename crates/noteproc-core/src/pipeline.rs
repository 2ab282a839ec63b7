/*
 * pipeline.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * An ordered list of stages together with the context they share.
 */

//! Pipeline execution.
//!
//! A [`Pipeline`] is produced by the [builder](crate::builder). Running it
//! parses the source text, runs every stage in build order and, unless the
//! pipeline is parse-only, serializes the result.

use noteproc_ast::{Node, NodeKind};

use crate::Result;
use crate::context::ProcContext;
use crate::diagnostic::DiagnosticMessage;
use crate::hast::{to_hast, to_html};
use crate::markdown::to_markdown;
use crate::parse::parse_markdown;
use crate::stage::Stage;

/// Serializer attached to a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compiler {
    Markdown,
    Html,
}

/// Result of [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProcOutput {
    /// The transformed tree of a parse-only pipeline
    Tree(Node),
    Markdown(String),
    Html(String),
}

impl ProcOutput {
    /// The serialized text, if the pipeline had a serializer.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ProcOutput::Tree(_) => None,
            ProcOutput::Markdown(text) | ProcOutput::Html(text) => Some(text),
        }
    }

    pub fn into_tree(self) -> Option<Node> {
        match self {
            ProcOutput::Tree(tree) => Some(tree),
            _ => None,
        }
    }
}

/// Stages in execution order plus the context they share.
pub struct Pipeline {
    context: ProcContext,
    stages: Vec<Box<dyn Stage>>,
    compiler: Option<Compiler>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("context", &self.context)
            .field("stages", &self.stage_names())
            .field("compiler", &self.compiler)
            .finish()
    }
}

impl Pipeline {
    pub fn new(context: ProcContext) -> Self {
        Self {
            context,
            stages: Vec::new(),
            compiler: None,
        }
    }

    /// Append a stage. Stages run in the order they are added.
    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    pub fn set_compiler(&mut self, compiler: Option<Compiler>) {
        self.compiler = compiler;
    }

    pub fn compiler(&self) -> Option<Compiler> {
        self.compiler
    }

    /// Names of all stages in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn context(&self) -> &ProcContext {
        &self.context
    }

    /// Remove and return the diagnostics recorded so far.
    pub fn take_diagnostics(&mut self) -> Vec<DiagnosticMessage> {
        std::mem::take(&mut self.context.diagnostics)
    }

    /// Diagnostics recorded so far, in order.
    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        &self.context.diagnostics
    }

    /// Parse source text without running any stage.
    pub fn parse(&self, source: &str) -> Node {
        parse_markdown(source)
    }

    /// Run every stage over `tree` in order.
    ///
    /// # Errors
    ///
    /// Returns the first fatal stage error. Execution stops on error.
    pub fn run_tree(&mut self, tree: &mut Node) -> Result<()> {
        for stage in &self.stages {
            tracing::debug!(stage = stage.name(), "Running stage");
            stage.transform(tree, &mut self.context)?;
        }
        Ok(())
    }

    /// Parse `source` and run every stage, returning the transformed tree.
    pub fn process(&mut self, source: &str) -> Result<Node> {
        let mut tree = self.parse(source);
        self.run_tree(&mut tree)?;
        Ok(tree)
    }

    /// Parse, transform and, when a serializer is attached, serialize.
    pub fn run(&mut self, source: &str) -> Result<ProcOutput> {
        let tree = self.process(source)?;
        Ok(match self.compiler {
            None => ProcOutput::Tree(tree),
            Some(Compiler::Markdown) => ProcOutput::Markdown(to_markdown(&tree)),
            Some(Compiler::Html) if is_rendering_tree(&tree) => ProcOutput::Html(to_html(&tree)),
            Some(Compiler::Html) => ProcOutput::Html(to_html(&to_hast(&tree)?)),
        })
    }
}

/// Whether `tree` only holds rendering-tree nodes.
fn is_rendering_tree(tree: &Node) -> bool {
    let mut rendering = true;
    tree.walk(&mut |node| {
        rendering &= matches!(
            node.kind,
            NodeKind::Root
                | NodeKind::Element { .. }
                | NodeKind::Text { .. }
                | NodeKind::Raw { .. }
                | NodeKind::Comment { .. }
        );
    });
    rendering
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ProcMode, ProcOptions};
    use std::sync::{Arc, Mutex};

    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Stage for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn transform(&self, _tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
            self.log.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    struct Failing;

    impl Stage for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn transform(&self, _tree: &mut Node, _ctx: &mut ProcContext) -> Result<()> {
            Err(crate::ProcError::stage("failing", "boom"))
        }
    }

    struct Warning;

    impl Stage for Warning {
        fn name(&self) -> &str {
            "warning"
        }

        fn transform(&self, tree: &mut Node, ctx: &mut ProcContext) -> Result<()> {
            crate::stage::warn(ctx, self.name(), "noted", tree);
            Ok(())
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(ProcContext::new(ProcOptions::new(ProcMode::NoData)))
    }

    #[test]
    fn test_stages_run_in_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut p = pipeline();
        for name in ["first", "second", "third"] {
            p.push(Box::new(Recording {
                name,
                log: Arc::clone(&log),
            }));
        }
        assert_eq!(p.stage_names(), ["first", "second", "third"]);
        p.process("text").unwrap();
        assert_eq!(*log.lock().unwrap(), ["first", "second", "third"]);
    }

    #[test]
    fn test_stage_error_stops_execution() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut p = pipeline();
        p.push(Box::new(Failing));
        p.push(Box::new(Recording {
            name: "after",
            log: Arc::clone(&log),
        }));
        assert!(p.process("x").is_err());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_take_diagnostics_drains() {
        let mut p = pipeline();
        p.push(Box::new(Warning));
        p.process("x").unwrap();
        let taken = p.take_diagnostics();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].stage.as_deref(), Some("warning"));
        assert!(p.diagnostics().is_empty());
    }

    #[test]
    fn test_output_depends_on_compiler() {
        let mut p = pipeline();
        let out = p.run("hello").unwrap();
        let tree = out.into_tree().unwrap();
        assert_eq!(tree.kind, NodeKind::Root);

        p.set_compiler(Some(Compiler::Html));
        assert_eq!(p.run("hello").unwrap().as_text(), Some("<p>hello</p>"));

        p.set_compiler(Some(Compiler::Markdown));
        assert_eq!(p.run("hello").unwrap().as_text(), Some("hello\n"));
    }
}
