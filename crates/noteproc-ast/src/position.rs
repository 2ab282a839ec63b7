/*
 * position.rs
 * Copyright (c) 2025 Posit, PBC
 */

use serde::{Deserialize, Serialize};

/// Byte span of a node in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl Position {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span from the start of `first` to the end of `last`.
    ///
    /// Returns `None` unless both endpoints are known.
    pub fn between(first: Option<&Position>, last: Option<&Position>) -> Option<Position> {
        match (first, last) {
            (Some(a), Some(b)) => Some(Position::new(a.start, b.end)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two spans share at least one byte.
    pub fn overlaps(&self, other: &Position) -> bool {
        self.start < other.end && other.start < self.end
    }
}
