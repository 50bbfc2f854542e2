//! Editor engine capability contract.
//!
//! # Responsibility
//! - Describe the small surface the core needs from a rich-text engine.
//! - Keep framework-specific editor types out of the synchronizer.
//!
//! # Invariants
//! - `replace_content` and `clear_content` never emit an update event.
//! - Highlight decorations never change the document or the selection.
//! - Every method on a destroyed instance returns `EditorError::Destroyed`,
//!   except `is_destroyed` and the width probes.

use crate::editor::config::EditorConfig;
use crate::model::document::DocNode;
use crate::model::selection::SelectionSnapshot;
use crate::model::ModelError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type EditorResult<T> = Result<T, EditorError>;

/// Shared handle to one live editor instance.
pub type EditorHandle = Rc<dyn EditorEngine>;

/// Errors reported by editor engine calls.
#[derive(Debug)]
pub enum EditorError {
    /// The instance has been torn down.
    Destroyed,
    /// Selection does not fit the current document.
    InvalidSelection { from: usize, to: usize, max: usize },
    /// The engine's configuration does not allow the requested content.
    Unsupported(&'static str),
    /// Engine-specific failure.
    Engine(String),
    Model(ModelError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Destroyed => write!(f, "editor instance is destroyed"),
            Self::InvalidSelection { from, to, max } => {
                write!(f, "selection {from}..{to} does not fit document size {max}")
            }
            Self::Unsupported(what) => write!(f, "editor does not support {what}"),
            Self::Engine(message) => write!(f, "editor engine failure: {message}"),
            Self::Model(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for EditorError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

/// Events an editor instance reports to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// Content changed through user input.
    Update,
    /// The instance received focus.
    Focus,
}

/// Spell-error decoration over a document range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// Id of the correction item that produced this decoration.
    pub item_id: String,
    pub from: usize,
    pub to: usize,
}

/// Attributes for an inserted image node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttributes {
    pub src: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Rich-text engine surface consumed by the core.
///
/// Implementations are single-threaded and use interior mutability; every
/// method takes `&self` so handles can be shared between the synchronizer,
/// the tracker and the spell-check orchestrator.
pub trait EditorEngine {
    fn config(&self) -> &EditorConfig;

    fn is_destroyed(&self) -> bool;

    /// Serializes the current document.
    fn document(&self) -> EditorResult<DocNode>;

    /// Replaces the whole document without emitting an update event.
    fn replace_content(&self, doc: &DocNode) -> EditorResult<()>;

    /// Resets to the empty document without emitting an update event.
    fn clear_content(&self) -> EditorResult<()>;

    fn plain_text(&self) -> EditorResult<String>;

    fn selection(&self) -> EditorResult<SelectionSnapshot>;

    fn set_selection(&self, selection: SelectionSnapshot) -> EditorResult<()>;

    fn focus(&self) -> EditorResult<()>;

    /// Replaces the current spell-error decorations.
    fn apply_highlights(&self, highlights: &[Highlight]) -> EditorResult<()>;

    /// Removes all spell-error decorations. Safe to call with none present.
    fn clear_highlights(&self) -> EditorResult<()>;

    /// Inserts an image at the current selection.
    fn insert_image(&self, image: &ImageAttributes) -> EditorResult<()>;

    /// Width available at the current selection (e.g. inside a table cell).
    fn selection_width(&self) -> Option<u32>;

    /// Width of the editor viewport.
    fn viewport_width(&self) -> Option<u32>;
}
