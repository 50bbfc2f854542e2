//! Domain model for plan sections and their rich-text slots.
//!
//! # Responsibility
//! - Define section/slot identity and the stored content shape.
//! - Define the structured document tree shared with editor engines.
//!
//! # Invariants
//! - The populated slots of a section are determined by its kind.
//! - Legacy plain-text slot values normalize into one-paragraph documents.

pub mod document;
pub mod section;
pub mod selection;

use crate::model::section::{SectionKind, SlotName};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation and conversion errors for model values.
#[derive(Debug)]
pub enum ModelError {
    InvalidSectionKey(String),
    SlotNotInSection { slot: SlotName, kind: SectionKind },
    PositionOutOfRange(usize),
    Serialization(serde_json::Error),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSectionKey(value) => write!(f, "invalid section key: `{value}`"),
            Self::SlotNotInSection { slot, kind } => {
                write!(f, "slot `{slot}` does not belong to a {kind:?} section")
            }
            Self::PositionOutOfRange(pos) => write!(f, "document position {pos} is out of range"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}
