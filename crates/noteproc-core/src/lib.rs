//! Configurable markdown processing pipelines for note workspaces
//!
//! This crate turns note markdown, with its wiki links, note references,
//! block anchors, tags and frontmatter variables, into normalized markdown
//! or HTML. A processor is assembled per request from a mode, an optional
//! flavor and partial data, then run over a single source text.
//!
//! # Architecture
//!
//! - [`ProcOptions`] - Processor mode, flavor and the parse-only switch
//! - [`ProcDataInput`] - Partial data supplied by the caller
//! - [`ProcContext`] - State shared by every stage of one pipeline
//! - [`Stage`] - A single tree transformation
//! - [`Pipeline`] - The ordered stages, their context and a serializer
//! - [`NoteEngine`] - Supplier of notes, configuration and workspace paths
//!
//! # Example
//!
//! ```ignore
//! use noteproc_core::{Destination, MemoryEngine, NoteProps, ProcDataInput, ProcFlavor, Vault};
//! use noteproc_core::builder::render_full;
//!
//! let engine = MemoryEngine::new("/ws")
//!     .with_note(NoteProps::new("n1", "home", "main").with_title("Home"))
//!     .into_arc();
//! let data = ProcDataInput::new()
//!     .with_engine(engine)
//!     .with_vault(Vault::new("main", "main"))
//!     .with_fname("home")
//!     .with_dest(Destination::Html);
//!
//! let mut pipeline = render_full(data, ProcFlavor::Regular)?;
//! let output = pipeline.run("Hello [[home]]")?;
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod hast;
pub mod markdown;
pub mod options;
pub mod parse;
pub mod pipeline;
pub mod stage;
pub mod stages;
pub mod syntax;

pub use builder::{
    build, build_named, build_parsing_pipeline, build_rendering_pipeline, full_pipeline,
    parse_for_html, parse_full, parse_import, parse_no_data, parse_tree, render_full,
};
pub use config::ProcConfig;
pub use context::{BacklinkHoverOpts, ProcContext, ProcDataInput, PublishOpts, WikiLinksOpts};
pub use diagnostic::{DiagnosticKind, DiagnosticMessage};
pub use engine::{MemoryEngine, NoteEngine, NoteProps, Vault};
pub use error::{ProcError, Result};
pub use hast::{to_hast, to_html};
pub use markdown::to_markdown;
pub use options::{Destination, ProcFlavor, ProcMode, ProcOptions};
pub use pipeline::{Compiler, Pipeline, ProcOutput};
pub use stage::Stage;
