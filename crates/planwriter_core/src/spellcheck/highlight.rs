//! Correction item → editor decoration mapping.

use crate::editor::engine::Highlight;
use crate::model::document::DocNode;
use crate::model::section::SlotName;
use crate::spellcheck::service::SpellCheckItem;

/// Builds the decorations for `slot`'s editor holding `doc`.
///
/// Items whose text range no longer fits the document are skipped rather
/// than clamped, since they point at text that has changed.
pub fn highlights_for_slot(doc: &DocNode, slot: SlotName, items: &[SpellCheckItem]) -> Vec<Highlight> {
    let layout = doc.text_layout();
    items
        .iter()
        .filter(|item| item.slot == slot)
        .filter_map(|item| {
            let from = layout.position_of(item.from)?;
            let to = layout.position_of(item.to)?;
            (to > from).then(|| Highlight {
                item_id: item.id.clone(),
                from,
                to,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::highlights_for_slot;
    use crate::model::document::DocNode;
    use crate::model::section::SlotName;
    use crate::spellcheck::service::SpellCheckItem;

    fn item(slot: SlotName, from: usize, to: usize) -> SpellCheckItem {
        SpellCheckItem {
            id: format!("{slot}-{from}"),
            slot,
            from,
            to,
            original: String::new(),
            suggestions: Vec::new(),
            reason: None,
        }
    }

    #[test]
    fn maps_text_offsets_to_positions_in_second_paragraph() {
        let doc = DocNode::doc(vec![
            DocNode::paragraph(vec![DocNode::text("first")]),
            DocNode::paragraph(vec![DocNode::text("teh end")]),
        ]);
        let items = vec![item(SlotName::Goals, 6, 9), item(SlotName::Skills, 0, 3)];

        let highlights = highlights_for_slot(&doc, SlotName::Goals, &items);
        assert_eq!(highlights.len(), 1);
        assert_eq!((highlights[0].from, highlights[0].to), (8, 11));
    }

    #[test]
    fn skips_items_past_the_end_of_the_text() {
        let doc = DocNode::from_plain_text("short");
        let items = vec![item(SlotName::Content, 3, 40)];
        assert!(highlights_for_slot(&doc, SlotName::Content, &items).is_empty());
    }
}
