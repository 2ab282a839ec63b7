/*
 * engine.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The note container that supplies documents and configuration.
 */

//! Note container interface.
//!
//! The pipeline does not own documents. A [`NoteEngine`] supplies the
//! note corpus, the ambient configuration and the workspace root whenever
//! the caller does not override them. [`MemoryEngine`] is a simple
//! in-memory implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ProcConfig;

/// A directory of notes inside the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vault {
    pub name: String,
    /// Path relative to the workspace root
    pub fs_path: PathBuf,
}

impl Vault {
    pub fn new(name: impl Into<String>, fs_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            fs_path: fs_path.into(),
        }
    }
}

/// An outgoing link recorded on a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteLink {
    /// File name of the link target
    pub to: String,
}

/// A note and its metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteProps {
    pub id: String,
    pub fname: String,
    pub title: String,
    pub desc: String,
    pub created: i64,
    pub updated: i64,
    /// Name of the vault holding the note
    pub vault: String,
    pub body: String,
    /// Frontmatter keys beyond the core fields
    pub custom: Map<String, Value>,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub links: Vec<NoteLink>,
}

impl NoteProps {
    pub fn new(id: impl Into<String>, fname: impl Into<String>, vault: impl Into<String>) -> Self {
        let fname = fname.into();
        let title = fname.rsplit('.').next().unwrap_or_default().to_string();
        Self {
            id: id.into(),
            fname,
            title,
            vault: vault.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_link(mut self, to: impl Into<String>) -> Self {
        self.links.push(NoteLink { to: to.into() });
        self
    }

    /// Whether the note opted out of publishing (`published: false`).
    pub fn is_published(&self) -> bool {
        self.custom
            .get("published")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }
}

/// Notes keyed by id, in insertion order.
pub type NotesById = IndexMap<String, NoteProps>;

/// Find a note by file name, optionally restricted to one vault.
///
/// File names compare case-insensitively.
pub fn find_note_by_fname<'a>(
    notes: &'a NotesById,
    fname: &str,
    vault: Option<&Vault>,
) -> Option<&'a NoteProps> {
    notes.values().find(|note| {
        note.fname.eq_ignore_ascii_case(fname) && vault.is_none_or(|v| v.name == note.vault)
    })
}

/// Substitution variables derived from a note's frontmatter.
///
/// Custom keys come first and are overridden by the core fields.
pub fn frontmatter_variables(note: &NoteProps) -> Map<String, Value> {
    let mut fm = note.custom.clone();
    fm.insert("id".into(), Value::from(note.id.clone()));
    fm.insert("title".into(), Value::from(note.title.clone()));
    fm.insert("desc".into(), Value::from(note.desc.clone()));
    fm.insert("created".into(), Value::from(note.created));
    fm.insert("updated".into(), Value::from(note.updated));
    fm
}

/// Supplier of documents, configuration and workspace layout.
pub trait NoteEngine: Send + Sync {
    /// The full corpus, used as the default lookup for reference stages.
    fn notes(&self) -> Arc<NotesById>;

    /// Ambient configuration of the workspace.
    fn config(&self) -> ProcConfig;

    fn ws_root(&self) -> PathBuf;

    fn find_note_by_fname(&self, fname: &str, vault: &Vault) -> Option<NoteProps> {
        find_note_by_fname(&self.notes(), fname, Some(vault)).cloned()
    }
}

/// In-memory note engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    notes: Arc<NotesById>,
    config: ProcConfig,
    ws_root: PathBuf,
}

impl MemoryEngine {
    pub fn new(ws_root: impl AsRef<Path>) -> Self {
        Self {
            ws_root: ws_root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_config(mut self, config: ProcConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_note(mut self, note: NoteProps) -> Self {
        Arc::make_mut(&mut self.notes).insert(note.id.clone(), note);
        self
    }

    pub fn into_arc(self) -> Arc<dyn NoteEngine> {
        Arc::new(self)
    }
}

impl NoteEngine for MemoryEngine {
    fn notes(&self) -> Arc<NotesById> {
        Arc::clone(&self.notes)
    }

    fn config(&self) -> ProcConfig {
        self.config.clone()
    }

    fn ws_root(&self) -> PathBuf {
        self.ws_root.clone()
    }
}
