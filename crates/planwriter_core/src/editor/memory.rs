//! In-process editor engine.
//!
//! # Responsibility
//! - Provide a complete `EditorEngine` without a UI toolkit, for hosts that
//!   drive the core headlessly (CLI, tests).
//! - Record content writes so callers can observe restore behavior.
//!
//! # Invariants
//! - `replace_content` resets the selection to the document start, the way a
//!   wholesale content swap does in a real engine.
//! - Highlights are stored beside the document and never touch it.

use crate::editor::config::{EditorConfig, Extension};
use crate::editor::engine::{EditorEngine, EditorError, EditorResult, Highlight, ImageAttributes};
use crate::model::document::DocNode;
use crate::model::section::SlotName;
use crate::model::selection::SelectionSnapshot;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const DEFAULT_VIEWPORT_WIDTH: u32 = 720;

#[derive(Debug)]
struct MemoryState {
    doc: DocNode,
    selection: SelectionSnapshot,
    highlights: Vec<Highlight>,
    images: Vec<ImageAttributes>,
}

/// Headless editor instance.
#[derive(Debug)]
pub struct MemoryEditor {
    config: EditorConfig,
    state: RefCell<MemoryState>,
    destroyed: Cell<bool>,
    failing: Cell<bool>,
    replace_count: Cell<usize>,
    clear_count: Cell<usize>,
    focus_count: Cell<usize>,
    selection_width: Cell<Option<u32>>,
    viewport_width: Cell<Option<u32>>,
}

impl MemoryEditor {
    /// Creates an empty editor configured for `slot`.
    pub fn new(slot: SlotName) -> Self {
        let doc = DocNode::empty_doc();
        let start = doc.start_position();
        Self {
            config: EditorConfig::for_slot(slot),
            state: RefCell::new(MemoryState {
                doc,
                selection: SelectionSnapshot::caret(start),
                highlights: Vec::new(),
                images: Vec::new(),
            }),
            destroyed: Cell::new(false),
            failing: Cell::new(false),
            replace_count: Cell::new(0),
            clear_count: Cell::new(0),
            focus_count: Cell::new(0),
            selection_width: Cell::new(None),
            viewport_width: Cell::new(Some(DEFAULT_VIEWPORT_WIDTH)),
        }
    }

    /// Creates a shared handle, the form the session binds.
    pub fn shared(slot: SlotName) -> Rc<Self> {
        Rc::new(Self::new(slot))
    }

    /// Simulates user typing at the selection head.
    ///
    /// The caller is responsible for reporting `EditorEvent::Update`.
    pub fn type_text(&self, value: &str) -> EditorResult<()> {
        self.ensure_alive()?;
        let mut state = self.state.borrow_mut();
        let at = state.selection.to;
        let cursor = state.doc.insert_text(at, value)?;
        state.selection = SelectionSnapshot::caret(cursor);
        Ok(())
    }

    /// Simulates a user-side document swap (e.g. paste of a whole document).
    pub fn load_document(&self, doc: DocNode) -> EditorResult<()> {
        self.ensure_alive()?;
        self.state.borrow_mut().doc = doc;
        Ok(())
    }

    /// Tears the instance down; later calls fail with `Destroyed`.
    pub fn destroy(&self) {
        self.destroyed.set(true);
    }

    /// Makes content-writing calls fail, to exercise error paths.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn set_selection_width(&self, width: Option<u32>) {
        self.selection_width.set(width);
    }

    pub fn set_viewport_width(&self, width: Option<u32>) {
        self.viewport_width.set(width);
    }

    /// Number of successful `replace_content` calls.
    pub fn replace_count(&self) -> usize {
        self.replace_count.get()
    }

    /// Number of successful `clear_content` calls.
    pub fn clear_count(&self) -> usize {
        self.clear_count.get()
    }

    pub fn focus_count(&self) -> usize {
        self.focus_count.get()
    }

    pub fn highlights(&self) -> Vec<Highlight> {
        self.state.borrow().highlights.clone()
    }

    pub fn inserted_images(&self) -> Vec<ImageAttributes> {
        self.state.borrow().images.clone()
    }

    fn ensure_alive(&self) -> EditorResult<()> {
        if self.destroyed.get() {
            return Err(EditorError::Destroyed);
        }
        Ok(())
    }

    fn ensure_writable(&self) -> EditorResult<()> {
        self.ensure_alive()?;
        if self.failing.get() {
            return Err(EditorError::Engine("content write rejected".to_string()));
        }
        Ok(())
    }
}

impl EditorEngine for MemoryEditor {
    fn config(&self) -> &EditorConfig {
        &self.config
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    fn document(&self) -> EditorResult<DocNode> {
        self.ensure_alive()?;
        Ok(self.state.borrow().doc.clone())
    }

    fn replace_content(&self, doc: &DocNode) -> EditorResult<()> {
        self.ensure_writable()?;
        let mut state = self.state.borrow_mut();
        state.doc = doc.clone();
        let start = state.doc.start_position();
        state.selection = SelectionSnapshot::caret(start);
        self.replace_count.set(self.replace_count.get() + 1);
        Ok(())
    }

    fn clear_content(&self) -> EditorResult<()> {
        self.ensure_writable()?;
        let mut state = self.state.borrow_mut();
        state.doc = DocNode::empty_doc();
        let start = state.doc.start_position();
        state.selection = SelectionSnapshot::caret(start);
        state.highlights.clear();
        self.clear_count.set(self.clear_count.get() + 1);
        Ok(())
    }

    fn plain_text(&self) -> EditorResult<String> {
        self.ensure_alive()?;
        Ok(self.state.borrow().doc.plain_text())
    }

    fn selection(&self) -> EditorResult<SelectionSnapshot> {
        self.ensure_alive()?;
        Ok(self.state.borrow().selection)
    }

    fn set_selection(&self, selection: SelectionSnapshot) -> EditorResult<()> {
        self.ensure_alive()?;
        let mut state = self.state.borrow_mut();
        let max = state.doc.content_size();
        if !selection.fits(max) {
            return Err(EditorError::InvalidSelection {
                from: selection.from,
                to: selection.to,
                max,
            });
        }
        state.selection = selection;
        Ok(())
    }

    fn focus(&self) -> EditorResult<()> {
        self.ensure_alive()?;
        self.focus_count.set(self.focus_count.get() + 1);
        Ok(())
    }

    fn apply_highlights(&self, highlights: &[Highlight]) -> EditorResult<()> {
        self.ensure_alive()?;
        self.state.borrow_mut().highlights = highlights.to_vec();
        Ok(())
    }

    fn clear_highlights(&self) -> EditorResult<()> {
        self.ensure_alive()?;
        self.state.borrow_mut().highlights.clear();
        Ok(())
    }

    fn insert_image(&self, image: &ImageAttributes) -> EditorResult<()> {
        self.ensure_writable()?;
        if !self.config.allows(Extension::Image) {
            return Err(EditorError::Unsupported("images"));
        }
        let mut state = self.state.borrow_mut();
        let node = DocNode::image(&image.src, image.width, image.height);
        state.doc.content.get_or_insert_with(Vec::new).push(node);
        state.images.push(image.clone());
        Ok(())
    }

    fn selection_width(&self) -> Option<u32> {
        self.selection_width.get()
    }

    fn viewport_width(&self) -> Option<u32> {
        self.viewport_width.get()
    }
}
