//! Editor selection snapshot.

use serde::{Deserialize, Serialize};

/// `{from, to}` document positions within one editor instance.
///
/// Snapshots are scoped to the editor they were taken from and are never
/// applied to another instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub from: usize,
    pub to: usize,
}

impl SelectionSnapshot {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn caret(pos: usize) -> Self {
        Self { from: pos, to: pos }
    }

    pub fn is_collapsed(&self) -> bool {
        self.from == self.to
    }

    /// Returns whether both ends fit inside a document of `max` positions.
    pub fn fits(&self, max: usize) -> bool {
        self.from <= self.to && self.to <= max
    }
}
