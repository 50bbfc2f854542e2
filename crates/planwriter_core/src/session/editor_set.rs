//! Editor instances bound to the slots of one section.

use crate::editor::engine::EditorHandle;
use crate::model::section::{SectionKind, SlotName};
use crate::model::ModelError;
use std::collections::BTreeMap;

/// Slot → editor bindings for the section currently on screen.
///
/// Unbound slots mean the host has not mounted that editor (yet).
#[derive(Clone)]
pub struct EditorSet {
    kind: SectionKind,
    bindings: BTreeMap<SlotName, EditorHandle>,
}

impl EditorSet {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            bindings: BTreeMap::new(),
        }
    }

    /// Binds `editor` to `slot`, replacing any previous binding.
    ///
    /// # Errors
    /// - `ModelError::SlotNotInSection` when `slot` is not owned by the kind.
    pub fn bind(&mut self, slot: SlotName, editor: EditorHandle) -> Result<(), ModelError> {
        if !self.kind.owns(slot) {
            return Err(ModelError::SlotNotInSection {
                slot,
                kind: self.kind,
            });
        }
        self.bindings.insert(slot, editor);
        Ok(())
    }

    /// Builder form of [`EditorSet::bind`].
    pub fn with(mut self, slot: SlotName, editor: EditorHandle) -> Result<Self, ModelError> {
        self.bind(slot, editor)?;
        Ok(self)
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn get(&self, slot: SlotName) -> Option<&EditorHandle> {
        self.bindings.get(&slot)
    }

    /// Bound editor for `slot` that has not been destroyed.
    pub fn live(&self, slot: SlotName) -> Option<&EditorHandle> {
        self.get(slot).filter(|editor| !editor.is_destroyed())
    }

    /// Live primary editor of the section.
    pub fn primary(&self) -> Option<&EditorHandle> {
        self.live(self.kind.primary_slot())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotName, &EditorHandle)> {
        self.bindings.iter().map(|(slot, editor)| (*slot, editor))
    }

    /// Live editors that take part in spell-check highlighting.
    pub fn spell_checked(&self) -> impl Iterator<Item = (SlotName, &EditorHandle)> {
        self.kind
            .spell_checked_slots()
            .iter()
            .filter_map(|slot| self.live(*slot).map(|editor| (*slot, editor)))
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
