//! Per-slot editor engine configuration.
//!
//! # Responsibility
//! - Declare which extensions each slot's editor enables.
//! - Provide the placeholder copy shown in empty editors.
//!
//! # Invariants
//! - Single-line slots never enable heading, table, image or hard break.
//! - Paste interception is enabled only where images are allowed.

use crate::model::section::SlotName;
use std::collections::BTreeSet;

/// Capability switched on in an editor engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Extension {
    Paragraph,
    Bold,
    Italic,
    Heading,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    HardBreak,
    BulletList,
    OrderedList,
    Highlight,
    TextStyle,
    Color,
    SpellErrorMark,
    Image,
    Table,
    DeleteTableOnDelete,
    SelectTableOnBorderClick,
    EnsureTrailingParagraph,
    Placeholder,
}

const RICH_EXTENSIONS: &[Extension] = &[
    Extension::Paragraph,
    Extension::Bold,
    Extension::Italic,
    Extension::Heading,
    Extension::Blockquote,
    Extension::CodeBlock,
    Extension::HorizontalRule,
    Extension::HardBreak,
    Extension::BulletList,
    Extension::OrderedList,
    Extension::Highlight,
    Extension::TextStyle,
    Extension::Color,
    Extension::SpellErrorMark,
    Extension::Image,
    Extension::Table,
    Extension::DeleteTableOnDelete,
    Extension::SelectTableOnBorderClick,
    Extension::EnsureTrailingParagraph,
    Extension::Placeholder,
];

const SINGLE_LINE_EXTENSIONS: &[Extension] = &[
    Extension::Paragraph,
    Extension::Bold,
    Extension::Italic,
    Extension::BulletList,
    Extension::OrderedList,
    Extension::Highlight,
    Extension::TextStyle,
    Extension::Color,
    Extension::SpellErrorMark,
    Extension::Placeholder,
];

const ANSWER_PLACEHOLDER: &str = "Enter your answer.";
const FEATURES_PLACEHOLDER: &str =
    "Describe the item's core features and what each of them implements or operates.";
const SKILLS_PLACEHOLDER: &str = "If you hold no separate technology or intellectual property, \
describe how you plan to develop the core technology the item needs.\n\
※ Intellectual property: patents, trademarks, designs, utility models, etc.";
const GOALS_PLACEHOLDER: &str = "Describe the ultimate goal you want to reach through this business.";
const GENERAL_PLACEHOLDER: &str =
    "Writing with the per-item checklist at hand raises your report score.";

/// Extension set and presentation options for one slot editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub slot: SlotName,
    pub extensions: BTreeSet<Extension>,
    pub placeholder: &'static str,
    /// Whether pasted clipboard images are intercepted and uploaded.
    pub intercept_paste: bool,
    /// Placeholder is shown only while the editor is editable.
    pub placeholder_only_when_editable: bool,
}

impl EditorConfig {
    /// Returns the configuration used for `slot`.
    pub fn for_slot(slot: SlotName) -> Self {
        let extensions = if slot.is_single_line() {
            SINGLE_LINE_EXTENSIONS
        } else {
            RICH_EXTENSIONS
        };
        let placeholder = match slot {
            SlotName::ItemName | SlotName::OneLineIntro => ANSWER_PLACEHOLDER,
            SlotName::Features => FEATURES_PLACEHOLDER,
            SlotName::Skills => SKILLS_PLACEHOLDER,
            SlotName::Goals => GOALS_PLACEHOLDER,
            SlotName::Content => GENERAL_PLACEHOLDER,
        };

        Self {
            slot,
            extensions: extensions.iter().copied().collect(),
            placeholder,
            intercept_paste: !slot.is_single_line(),
            placeholder_only_when_editable: true,
        }
    }

    pub fn allows(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorConfig, Extension};
    use crate::model::section::SlotName;

    #[test]
    fn single_line_slots_disable_block_features() {
        for slot in [SlotName::ItemName, SlotName::OneLineIntro] {
            let config = EditorConfig::for_slot(slot);
            for disabled in [
                Extension::Heading,
                Extension::Table,
                Extension::Image,
                Extension::HardBreak,
                Extension::Blockquote,
                Extension::CodeBlock,
                Extension::HorizontalRule,
            ] {
                assert!(!config.allows(disabled), "{slot} should not allow {disabled:?}");
            }
            assert!(config.allows(Extension::Highlight));
            assert!(!config.intercept_paste);
        }
    }

    #[test]
    fn rich_slots_enable_images_and_paste_interception() {
        for slot in [
            SlotName::Features,
            SlotName::Skills,
            SlotName::Goals,
            SlotName::Content,
        ] {
            let config = EditorConfig::for_slot(slot);
            assert!(config.allows(Extension::Image));
            assert!(config.allows(Extension::Table));
            assert!(config.intercept_paste);
            assert!(!config.placeholder.is_empty());
        }
    }
}
