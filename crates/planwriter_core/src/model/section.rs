//! Business-plan section model.
//!
//! # Responsibility
//! - Define section keys, kinds and the slot set each kind owns.
//! - Hold per-section slot contents as stored by the document store.
//!
//! # Invariants
//! - Key `"0"` is the Overview section; every other key is General.
//! - A `SectionContent` only ever holds slots belonging to its section kind.

use crate::model::document::SlotContent;
use crate::model::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Section key reserved for the overview section.
pub const OVERVIEW_SECTION_KEY: &str = "0";

/// Stable section identifier (`number` in the plan outline).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionKey(String);

impl SectionKey {
    /// Creates a key from trimmed, non-empty input.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ModelError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidSectionKey(value.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn overview() -> Self {
        Self(OVERVIEW_SECTION_KEY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> SectionKind {
        if self.0 == OVERVIEW_SECTION_KEY {
            SectionKind::Overview
        } else {
            SectionKind::General
        }
    }
}

impl Display for SectionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named rich-text field within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotName {
    /// Overview: item name (single line).
    ItemName,
    /// Overview: one-line introduction (single line).
    OneLineIntro,
    /// Overview: core features. Primary editor of the overview section.
    Features,
    /// Overview: skills and intellectual property.
    Skills,
    /// Overview: goals.
    Goals,
    /// General: the only slot.
    Content,
}

impl SlotName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ItemName => "itemName",
            Self::OneLineIntro => "oneLineIntro",
            Self::Features => "features",
            Self::Skills => "skills",
            Self::Goals => "goals",
            Self::Content => "content",
        }
    }

    /// Single-line slots have a reduced editor extension set.
    pub fn is_single_line(self) -> bool {
        matches!(self, Self::ItemName | Self::OneLineIntro)
    }
}

impl Display for SlotName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const OVERVIEW_SLOTS: &[SlotName] = &[
    SlotName::ItemName,
    SlotName::OneLineIntro,
    SlotName::Features,
    SlotName::Skills,
    SlotName::Goals,
];
const GENERAL_SLOTS: &[SlotName] = &[SlotName::Content];
const OVERVIEW_SPELL_SLOTS: &[SlotName] = &[SlotName::Features, SlotName::Skills, SlotName::Goals];

/// Section layout category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Overview,
    General,
}

impl SectionKind {
    /// All slots owned by this kind, in display order.
    pub fn slots(self) -> &'static [SlotName] {
        match self {
            Self::Overview => OVERVIEW_SLOTS,
            Self::General => GENERAL_SLOTS,
        }
    }

    /// Slots whose editors take part in spell-check highlighting.
    pub fn spell_checked_slots(self) -> &'static [SlotName] {
        match self {
            Self::Overview => OVERVIEW_SPELL_SLOTS,
            Self::General => GENERAL_SLOTS,
        }
    }

    /// Fallback editor for focus and image insertion.
    pub fn primary_slot(self) -> SlotName {
        match self {
            Self::Overview => SlotName::Features,
            Self::General => SlotName::Content,
        }
    }

    pub fn owns(self, slot: SlotName) -> bool {
        self.slots().contains(&slot)
    }
}

/// Partial slot update: `None` clears the slot.
pub type SlotPatch = BTreeMap<SlotName, Option<SlotContent>>;

/// Stored contents of one section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionContent {
    slots: BTreeMap<SlotName, SlotContent>,
}

impl SectionContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: SlotName) -> Option<&SlotContent> {
        self.slots.get(&slot)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn populated_slots(&self) -> impl Iterator<Item = SlotName> + '_ {
        self.slots.keys().copied()
    }

    /// Rejects slots that do not belong to `kind`.
    pub fn validate_for(&self, kind: SectionKind) -> Result<(), ModelError> {
        match self.slots.keys().find(|slot| !kind.owns(**slot)) {
            Some(slot) => Err(ModelError::SlotNotInSection { slot: *slot, kind }),
            None => Ok(()),
        }
    }

    /// Merges a patch after checking every slot belongs to `kind`.
    ///
    /// The patch is applied all-or-nothing.
    pub fn apply_patch(&mut self, kind: SectionKind, patch: SlotPatch) -> Result<(), ModelError> {
        if let Some(slot) = patch.keys().find(|slot| !kind.owns(**slot)) {
            return Err(ModelError::SlotNotInSection { slot: *slot, kind });
        }
        for (slot, value) in patch {
            match value {
                Some(content) => {
                    self.slots.insert(slot, content);
                }
                None => {
                    self.slots.remove(&slot);
                }
            }
        }
        Ok(())
    }
}
