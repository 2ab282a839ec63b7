/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Pipeline-scoped context shared by all stages.
 */

//! Pipeline context.
//!
//! [`ProcContext`] is owned by exactly one [`Pipeline`](crate::Pipeline)
//! and passed by `&mut` to every stage. It is populated by the builder from
//! a [`ProcDataInput`]: explicitly supplied fields win, and anything left
//! out is derived from the note engine by the named `*_from_engine`
//! functions in this module.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::ProcConfig;
use crate::diagnostic::DiagnosticMessage;
use crate::engine::{NoteEngine, NoteProps, NotesById, Vault, find_note_by_fname};
use crate::options::{Destination, ProcFlavor, ProcOptions};

/// Options of the wiki link stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WikiLinksOpts {
    /// `Some(false)` leaves wiki links unconverted, for output that an
    /// external converter post-processes.
    pub convert_links: Option<bool>,
    /// Link to note ids instead of file names.
    pub use_id: bool,
    pub prefix: Option<String>,
}

impl WikiLinksOpts {
    pub fn converts_links(&self) -> bool {
        self.convert_links != Some(false)
    }
}

/// Caller overrides for the publishing transform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOpts {
    pub insert_title: Option<bool>,
    pub transform_no_publish: Option<bool>,
    pub link_prefix: Option<String>,
}

/// Byte range of the source to highlight in backlink hovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacklinkHoverOpts {
    pub start: usize,
    pub end: usize,
}

/// Partial context data supplied to the builder.
#[derive(Clone, Default)]
pub struct ProcDataInput {
    pub engine: Option<Arc<dyn NoteEngine>>,
    pub vault: Option<Vault>,
    pub fname: Option<String>,
    pub dest: Option<Destination>,
    /// Alternative note lookup used when resolving references
    pub notes: Option<Arc<NotesById>>,
    pub inside_note_ref: Option<bool>,
    /// Frontmatter variables exposed for substitution
    pub fm: Option<Map<String, Value>>,
    pub wiki_links: Option<WikiLinksOpts>,
    pub publish: Option<PublishOpts>,
    pub backlink_hover: Option<BacklinkHoverOpts>,
    pub config: Option<ProcConfig>,
    pub ws_root: Option<PathBuf>,
    pub note_ref_level: Option<usize>,
}

impl ProcDataInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, engine: Arc<dyn NoteEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_vault(mut self, vault: Vault) -> Self {
        self.vault = Some(vault);
        self
    }

    pub fn with_fname(mut self, fname: impl Into<String>) -> Self {
        self.fname = Some(fname.into());
        self
    }

    pub fn with_dest(mut self, dest: Destination) -> Self {
        self.dest = Some(dest);
        self
    }

    pub fn with_notes(mut self, notes: Arc<NotesById>) -> Self {
        self.notes = Some(notes);
        self
    }

    pub fn with_inside_note_ref(mut self, inside: bool) -> Self {
        self.inside_note_ref = Some(inside);
        self
    }

    pub fn with_fm(mut self, fm: Map<String, Value>) -> Self {
        self.fm = Some(fm);
        self
    }

    pub fn with_wiki_links(mut self, opts: WikiLinksOpts) -> Self {
        self.wiki_links = Some(opts);
        self
    }

    pub fn with_publish(mut self, opts: PublishOpts) -> Self {
        self.publish = Some(opts);
        self
    }

    pub fn with_backlink_hover(mut self, opts: BacklinkHoverOpts) -> Self {
        self.backlink_hover = Some(opts);
        self
    }

    pub fn with_config(mut self, config: ProcConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_ws_root(mut self, ws_root: impl Into<PathBuf>) -> Self {
        self.ws_root = Some(ws_root.into());
        self
    }

    pub fn with_note_ref_level(mut self, level: usize) -> Self {
        self.note_ref_level = Some(level);
        self
    }

    /// Whether wiki links should be converted (the default).
    pub fn converts_links(&self) -> bool {
        self.wiki_links
            .as_ref()
            .is_none_or(WikiLinksOpts::converts_links)
    }
}

impl std::fmt::Debug for ProcDataInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcDataInput")
            .field("engine", &self.engine.as_ref().map(|_| "<engine>"))
            .field("vault", &self.vault)
            .field("fname", &self.fname)
            .field("dest", &self.dest)
            .field("inside_note_ref", &self.inside_note_ref)
            .field("note_ref_level", &self.note_ref_level)
            .finish_non_exhaustive()
    }
}

/// A field that a processor mode may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Vault,
    Engine,
    Fname,
    Dest,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::Vault => "vault",
            RequiredField::Engine => "engine",
            RequiredField::Fname => "fname",
            RequiredField::Dest => "dest",
        }
    }

    pub fn is_present(&self, data: &ProcDataInput) -> bool {
        match self {
            RequiredField::Vault => data.vault.is_some(),
            RequiredField::Engine => data.engine.is_some(),
            RequiredField::Fname => data.fname.is_some(),
            RequiredField::Dest => data.dest.is_some(),
        }
    }
}

/// Names of every required field absent from `data`, in declaration order.
pub fn missing_fields(required: &[RequiredField], data: &ProcDataInput) -> Vec<String> {
    required
        .iter()
        .filter(|field| !field.is_present(data))
        .map(|field| field.as_str().to_string())
        .collect()
}

/// Explicit notes win, else the engine's corpus.
pub fn notes_from_engine(data: &ProcDataInput) -> Option<Arc<NotesById>> {
    data.notes
        .clone()
        .or_else(|| data.engine.as_ref().map(|engine| engine.notes()))
}

/// Explicit configuration wins, else the engine's, else defaults.
pub fn config_from_engine(data: &ProcDataInput) -> ProcConfig {
    match (&data.config, &data.engine) {
        (Some(config), _) => config.clone(),
        (None, Some(engine)) => engine.config(),
        (None, None) => ProcConfig::default(),
    }
}

/// Explicit workspace root wins, else the engine's.
pub fn ws_root_from_engine(data: &ProcDataInput) -> Option<PathBuf> {
    data.ws_root
        .clone()
        .or_else(|| data.engine.as_ref().map(|engine| engine.ws_root()))
}

/// Mutable state of one pipeline instance.
#[derive(Clone)]
pub struct ProcContext {
    /// Build-time options; fixed for the pipeline's lifetime
    pub options: ProcOptions,
    pub dest: Option<Destination>,
    pub vault: Option<Vault>,
    pub fname: Option<String>,
    pub engine: Option<Arc<dyn NoteEngine>>,
    pub ws_root: Option<PathBuf>,
    /// Resolved once at build time; read it through [`ProcContext::config`]
    pub(crate) config: ProcConfig,
    /// Lookup used by reference-resolving stages
    pub notes: Option<Arc<NotesById>>,
    /// This pipeline renders the content of another note's reference
    pub inside_note_ref: bool,
    pub fm: Option<Map<String, Value>>,
    pub note_ref_level: usize,
    pub wiki_links: WikiLinksOpts,
    pub publish: PublishOpts,
    pub backlink_hover: Option<BacklinkHoverOpts>,
    /// Non-fatal problems recorded by stages, in order
    pub diagnostics: Vec<DiagnosticMessage>,
}

impl ProcContext {
    pub fn new(options: ProcOptions) -> Self {
        Self {
            options,
            dest: None,
            vault: None,
            fname: None,
            engine: None,
            ws_root: None,
            config: ProcConfig::default(),
            notes: None,
            inside_note_ref: false,
            fm: None,
            note_ref_level: 0,
            wiki_links: WikiLinksOpts::default(),
            publish: PublishOpts::default(),
            backlink_hover: None,
            diagnostics: Vec::new(),
        }
    }

    /// Merge partial data into the context.
    ///
    /// Supplied fields overwrite, absent fields keep their current value.
    /// `notes` falls back to the engine's corpus, `config` and `ws_root`
    /// to the engine's values when neither the input nor the context has one.
    pub fn merge(&mut self, data: ProcDataInput) {
        let notes = notes_from_engine(&data);
        if data.config.is_some() || data.engine.is_some() {
            self.config = config_from_engine(&data);
        }
        if let Some(ws_root) = ws_root_from_engine(&data) {
            self.ws_root = Some(ws_root);
        }
        if notes.is_some() {
            self.notes = notes;
        }

        let ProcDataInput {
            engine,
            vault,
            fname,
            dest,
            inside_note_ref,
            fm,
            wiki_links,
            publish,
            backlink_hover,
            note_ref_level,
            ..
        } = data;

        if engine.is_some() {
            self.engine = engine;
        }
        if vault.is_some() {
            self.vault = vault;
        }
        if fname.is_some() {
            self.fname = fname;
        }
        if dest.is_some() {
            self.dest = dest;
        }
        if let Some(inside) = inside_note_ref {
            self.inside_note_ref = inside;
        }
        if fm.is_some() {
            self.fm = fm;
        }
        if let Some(opts) = wiki_links {
            self.wiki_links = opts;
        }
        if let Some(opts) = publish {
            self.publish = opts;
        }
        if backlink_hover.is_some() {
            self.backlink_hover = backlink_hover;
        }
        if let Some(level) = note_ref_level {
            self.note_ref_level = level;
        }
    }

    /// Partial data for a nested pipeline that processes another note.
    ///
    /// The nested pipeline shares the container, destination and lookup,
    /// and never inherits the frontmatter or hover range of this note.
    pub fn nested_data(&self, fname: &str, vault: Option<Vault>) -> ProcDataInput {
        ProcDataInput {
            engine: self.engine.clone(),
            vault: vault.or_else(|| self.vault.clone()),
            fname: Some(fname.to_string()),
            dest: self.dest,
            notes: self.notes.clone(),
            inside_note_ref: Some(true),
            fm: None,
            wiki_links: Some(self.wiki_links.clone()),
            publish: Some(self.publish.clone()),
            backlink_hover: None,
            config: Some(self.config.clone()),
            ws_root: self.ws_root.clone(),
            note_ref_level: Some(self.note_ref_level + 1),
        }
    }

    /// Configuration resolved while the pipeline was built.
    pub fn config(&self) -> &ProcConfig {
        &self.config
    }

    pub fn flavor(&self) -> ProcFlavor {
        self.options.flavor()
    }

    /// Publishing rules apply when rendering HTML for the publishing flavor.
    pub fn should_apply_publishing_rules(&self) -> bool {
        self.dest == Some(Destination::Html) && self.flavor() == ProcFlavor::Publishing
    }

    /// The note this pipeline processes, looked up in the note lookup.
    pub fn current_note(&self) -> Option<&NoteProps> {
        let fname = self.fname.as_deref()?;
        let notes = self.notes.as_deref()?;
        find_note_by_fname(notes, fname, self.vault.as_ref())
    }

    /// Find any note by file name, preferring the current vault.
    pub fn find_note(&self, fname: &str) -> Option<&NoteProps> {
        let notes = self.notes.as_deref()?;
        find_note_by_fname(notes, fname, self.vault.as_ref())
            .or_else(|| find_note_by_fname(notes, fname, None))
    }

    /// Record a diagnostic.
    pub fn add_diagnostic(&mut self, diagnostic: DiagnosticMessage) {
        tracing::warn!(
            stage = diagnostic.stage.as_deref().unwrap_or("-"),
            "{}",
            diagnostic.title
        );
        self.diagnostics.push(diagnostic);
    }

    pub fn add_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = DiagnosticMessage>) {
        self.diagnostics.extend(diagnostics);
    }
}

impl std::fmt::Debug for ProcContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcContext")
            .field("options", &self.options)
            .field("dest", &self.dest)
            .field("vault", &self.vault)
            .field("fname", &self.fname)
            .field("ws_root", &self.ws_root)
            .field("config", &self.config)
            .field("notes", &self.notes.as_ref().map(|n| n.len()))
            .field("inside_note_ref", &self.inside_note_ref)
            .field("note_ref_level", &self.note_ref_level)
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use crate::options::ProcMode;

    fn engine() -> Arc<dyn NoteEngine> {
        MemoryEngine::new("/ws")
            .with_note(NoteProps::new("a", "alpha", "main"))
            .into_arc()
    }

    #[test]
    fn test_missing_fields_in_declaration_order() {
        let required = [
            RequiredField::Vault,
            RequiredField::Engine,
            RequiredField::Fname,
            RequiredField::Dest,
        ];
        let data = ProcDataInput::new().with_fname("alpha");
        assert_eq!(missing_fields(&required, &data), ["vault", "engine", "dest"]);
    }

    #[test]
    fn test_notes_prefer_explicit_lookup() {
        let explicit = Arc::new(NotesById::new());
        let data = ProcDataInput::new()
            .with_engine(engine())
            .with_notes(Arc::clone(&explicit));
        assert!(notes_from_engine(&data).unwrap().is_empty());

        let data = ProcDataInput::new().with_engine(engine());
        assert_eq!(notes_from_engine(&data).unwrap().len(), 1);
        assert!(notes_from_engine(&ProcDataInput::new()).is_none());
    }

    #[test]
    fn test_ws_root_and_config_fall_back_to_engine() {
        let data = ProcDataInput::new().with_engine(engine());
        assert_eq!(ws_root_from_engine(&data), Some(PathBuf::from("/ws")));
        let data = data.with_ws_root("/other");
        assert_eq!(ws_root_from_engine(&data), Some(PathBuf::from("/other")));
        assert_eq!(config_from_engine(&ProcDataInput::new()), ProcConfig::default());
    }

    #[test]
    fn test_merge_keeps_existing_fields() {
        let mut ctx = ProcContext::new(ProcOptions::new(ProcMode::Full));
        ctx.merge(
            ProcDataInput::new()
                .with_engine(engine())
                .with_fname("alpha")
                .with_vault(Vault::new("main", "main")),
        );
        ctx.merge(ProcDataInput::new().with_note_ref_level(2));

        assert_eq!(ctx.fname.as_deref(), Some("alpha"));
        assert_eq!(ctx.note_ref_level, 2);
        assert_eq!(ctx.current_note().unwrap().id, "a");
        assert!(ctx.find_note("ALPHA").is_some());
    }

    #[test]
    fn test_publishing_rules() {
        let opts = ProcOptions::new(ProcMode::Full).with_flavor(ProcFlavor::Publishing);
        let mut ctx = ProcContext::new(opts);
        assert!(!ctx.should_apply_publishing_rules());
        ctx.dest = Some(Destination::Html);
        assert!(ctx.should_apply_publishing_rules());
        ctx.options.flavor = None;
        assert!(!ctx.should_apply_publishing_rules());
    }
}
