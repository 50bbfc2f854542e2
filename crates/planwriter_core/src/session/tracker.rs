//! Last-focused editor tracking.
//!
//! # Invariants
//! - The tracker never keeps an editor alive; it holds a weak reference.
//! - A destroyed or dropped editor is never reported as active.

use crate::editor::engine::{EditorEngine, EditorHandle};
use crate::model::section::SlotName;
use std::rc::{Rc, Weak};

struct ActiveEditor {
    slot: SlotName,
    editor: Weak<dyn EditorEngine>,
}

/// Remembers which editor the user worked in last.
#[derive(Default)]
pub struct ActiveEditorTracker {
    active: Option<ActiveEditor>,
}

impl ActiveEditorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a focus event on `editor`.
    pub fn focus(&mut self, slot: SlotName, editor: &EditorHandle) {
        self.active = Some(ActiveEditor {
            slot,
            editor: Rc::downgrade(editor),
        });
    }

    /// Last-focused editor, if it is still alive.
    pub fn active(&self) -> Option<(SlotName, EditorHandle)> {
        let active = self.active.as_ref()?;
        let editor = active.editor.upgrade()?;
        (!editor.is_destroyed()).then_some((active.slot, editor))
    }

    pub fn active_slot(&self) -> Option<SlotName> {
        self.active().map(|(slot, _)| slot)
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::ActiveEditorTracker;
    use crate::editor::engine::EditorHandle;
    use crate::editor::memory::MemoryEditor;
    use crate::model::section::SlotName;

    #[test]
    fn forgets_destroyed_and_dropped_editors() {
        let mut tracker = ActiveEditorTracker::new();
        let skills = MemoryEditor::shared(SlotName::Skills);
        let handle: EditorHandle = skills.clone();
        tracker.focus(SlotName::Skills, &handle);
        assert_eq!(tracker.active_slot(), Some(SlotName::Skills));

        skills.destroy();
        assert!(tracker.active().is_none());

        let goals: EditorHandle = MemoryEditor::shared(SlotName::Goals);
        tracker.focus(SlotName::Goals, &goals);
        drop(goals);
        drop(handle);
        assert!(tracker.active().is_none());
    }
}
