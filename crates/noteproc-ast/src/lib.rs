/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Syntax tree type definitions for noteproc.
 *
 * A single node type is used for both the parsed source tree and the
 * rendering tree produced from it. Node kinds form a closed sum type with
 * an explicit `Unknown` branch for kinds introduced by external stages.
 */

pub mod data;
pub mod node;
pub mod position;

pub use data::{NodeData, PropValue, Properties, RenderHints, properties};
pub use node::{Align, Node, NodeKind};
pub use position::Position;
