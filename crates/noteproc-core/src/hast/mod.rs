/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rendering tree construction and serialization.
 */

pub mod convert;
pub mod html;
pub mod table;

pub use convert::{Converter, augment, to_hast, trim_lines, wrap};
pub use html::to_html;
pub use table::lower_table;
