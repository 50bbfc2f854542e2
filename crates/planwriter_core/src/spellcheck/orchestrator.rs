//! Spell-check run state and editor decorations.
//!
//! # Responsibility
//! - Build a request from the live editors of the current section.
//! - Track loading/panel state and the correction items of the last run.
//! - Push and clear highlight decorations on the spell-checked editors.
//!
//! # Invariants
//! - Only the most recent ticket may complete; older completions are dropped.
//! - Items never survive a section change or a wholesale content replace.
//! - Decoration failures are logged and never surface to the caller.
//!
//! # See also
//! - `session::write_session` for when highlights are applied.

use crate::model::section::{SectionKey, SectionKind, SlotName};
use crate::notice::{UserNotifier, SPELL_CHECK_FAILED};
use crate::session::editor_set::EditorSet;
use crate::spellcheck::highlight::highlights_for_slot;
use crate::spellcheck::service::{
    map_spell_response, SpellCheckError, SpellCheckItem, SpellCheckRequest, SpellCheckResponse,
};
use log::{debug, info, warn};

/// Proof of a started run; hand it back to `complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellCheckTicket {
    generation: u64,
    pub request: SpellCheckRequest,
}

impl SpellCheckTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct SpellCheckOrchestrator {
    checking_active: bool,
    panel_open: bool,
    loading: bool,
    items: Vec<SpellCheckItem>,
    generation: u64,
}

impl SpellCheckOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run for `section`.
    ///
    /// Flips the checking flag, opens the panel, clears existing decorations
    /// and marks the run as loading.
    pub fn begin(&mut self, section: &SectionKey, title: &str, editors: &EditorSet) -> SpellCheckTicket {
        self.checking_active = !self.checking_active;
        self.panel_open = true;
        clear_highlights(editors);
        self.loading = true;
        self.generation += 1;

        let request = build_request(section, title, editors);
        debug!(
            "event=spell_check_begin module=spellcheck section={section} generation={} slots={}",
            self.generation,
            request.slots.len()
        );
        SpellCheckTicket {
            generation: self.generation,
            request,
        }
    }

    /// Finishes the run identified by `ticket`.
    ///
    /// Returns `false` when the ticket was superseded and nothing changed.
    pub fn complete(
        &mut self,
        ticket: &SpellCheckTicket,
        result: Result<SpellCheckResponse, SpellCheckError>,
        notifier: &dyn UserNotifier,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "event=spell_check_complete module=spellcheck status=stale generation={} current={}",
                ticket.generation, self.generation
            );
            return false;
        }

        match result {
            Ok(response) => {
                self.items = map_spell_response(response);
                info!(
                    "event=spell_check_complete module=spellcheck status=ok section={} items={}",
                    ticket.request.section_id,
                    self.items.len()
                );
            }
            Err(err) => {
                self.items.clear();
                warn!(
                    "event=spell_check_complete module=spellcheck status=error section={} error={err}",
                    ticket.request.section_id
                );
                notifier.notify(SPELL_CHECK_FAILED);
            }
        }
        self.loading = false;
        true
    }

    /// Drops items and decorations and invalidates any in-flight run.
    pub fn reset(&mut self, editors: Option<&EditorSet>) {
        self.items.clear();
        self.loading = false;
        self.generation += 1;
        if let Some(editors) = editors {
            clear_highlights(editors);
        }
    }

    /// Drops items and decorations, keeping any in-flight run.
    pub fn discard_items(&mut self, editors: &EditorSet) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        clear_highlights(editors);
    }

    /// Re-applies decorations for the current items on every spell-checked editor.
    pub fn apply_highlights(&self, editors: &EditorSet) {
        for (slot, editor) in editors.spell_checked() {
            let result = editor
                .document()
                .map(|doc| highlights_for_slot(&doc, slot, &self.items))
                .and_then(|highlights| editor.apply_highlights(&highlights));
            if let Err(err) = result {
                warn!("event=spell_highlight module=spellcheck status=error slot={slot} error={err}");
            }
        }
    }

    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    pub fn items(&self) -> &[SpellCheckItem] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_checking_active(&self) -> bool {
        self.checking_active
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }
}

fn clear_highlights(editors: &EditorSet) {
    for (slot, editor) in editors.spell_checked() {
        if let Err(err) = editor.clear_highlights() {
            warn!("event=spell_highlight_clear module=spellcheck status=error slot={slot} error={err}");
        }
    }
}

fn build_request(section: &SectionKey, title: &str, editors: &EditorSet) -> SpellCheckRequest {
    let text_of = |slot: SlotName| {
        editors
            .live(slot)
            .and_then(|editor| editor.plain_text().ok())
            .unwrap_or_default()
    };
    let (item_name, one_line_intro) = match editors.kind() {
        SectionKind::Overview => (text_of(SlotName::ItemName), text_of(SlotName::OneLineIntro)),
        SectionKind::General => (String::new(), String::new()),
    };
    SpellCheckRequest {
        section_id: section.to_string(),
        title: title.to_string(),
        item_name,
        one_line_intro,
        slots: editors
            .kind()
            .spell_checked_slots()
            .iter()
            .map(|slot| (*slot, text_of(*slot)))
            .collect(),
    }
}
