//! Bidirectional sync between a section's editors and the document store.
//!
//! # Responsibility
//! - Restore stored slot content into the editors without echoing updates.
//! - Write every slot back to the store on each edit, synchronously.
//! - Debounce the remote save and restore selections on the next frame.
//!
//! # Invariants
//! - Restore never writes an editor whose content already matches the store.
//! - An empty or missing store value resets a non-empty editor exactly once.
//! - Destroyed editors are skipped on both read and write.
//! - Pending save and selection tasks never outlive the section they belong to.
//!
//! # See also
//! - `session::write_session` for event routing and task execution.

use crate::editor::engine::{EditorEngine, EditorHandle, EditorResult};
use crate::model::document::{DocNode, SlotContent};
use crate::model::section::{SectionKey, SectionKind, SlotName, SlotPatch};
use crate::model::selection::SelectionSnapshot;
use crate::runtime::deferred::{Debouncer, FrameSlot};
use crate::runtime::scheduler::{FrameHandle, Scheduler, TimerHandle};
use crate::session::editor_set::EditorSet;
use crate::session::task::SessionTask;
use crate::session::tracker::ActiveEditorTracker;
use crate::store::document_store::DocumentStore;
use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

/// Remote-save lifecycle of the open section.
///
/// `PlanRepository::save_sections` is synchronous, so `Saving` only holds
/// while `run_remote_save` is on the stack. Callers of the session see
/// `PendingSave` before the save and `Idle` or `SaveFailed` after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveCycle {
    Idle,
    /// Debounce timer armed.
    PendingSave,
    /// Backend call in progress; transient, see the type docs.
    Saving,
    /// Last backend call failed; content stays in the store.
    SaveFailed,
}

/// What a restore pass did to one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Editor already matched the store.
    Unchanged,
    /// Editor content was replaced by the stored document.
    Replaced,
    /// Editor was reset to the empty document.
    Cleared,
    /// No live editor is bound to the slot.
    Skipped,
    /// The engine rejected the write; logged.
    Failed,
}

impl RestoreOutcome {
    pub fn wrote_content(self) -> bool {
        matches!(self, Self::Replaced | Self::Cleared)
    }
}

struct OpenSection {
    key: SectionKey,
    editors: EditorSet,
    observed_revision: u64,
}

pub struct SectionSynchronizer {
    store: Rc<RefCell<DocumentStore>>,
    open: Option<OpenSection>,
    save_debounce: Debouncer,
    selection_frame: FrameSlot,
    save_cycle: SaveCycle,
}

impl SectionSynchronizer {
    pub fn new(store: Rc<RefCell<DocumentStore>>, save_delay: Duration) -> Self {
        Self {
            store,
            open: None,
            save_debounce: Debouncer::new(save_delay),
            selection_frame: FrameSlot::new(),
            save_cycle: SaveCycle::Idle,
        }
    }

    /// Switches to `key` with `editors` and restores its stored content.
    ///
    /// Pending work of the outgoing section is cancelled first.
    pub fn open(
        &mut self,
        key: SectionKey,
        editors: EditorSet,
        scheduler: &mut Scheduler<SessionTask>,
    ) -> Vec<(SlotName, RestoreOutcome)> {
        self.close(scheduler);
        debug!(
            "event=section_open module=session section={key} kind={:?} editors={}",
            editors.kind(),
            editors.iter().count()
        );
        self.open = Some(OpenSection {
            key,
            editors,
            observed_revision: 0,
        });
        self.restore()
    }

    /// Cancels pending work and drops the editor bindings.
    pub fn close(&mut self, scheduler: &mut Scheduler<SessionTask>) {
        let cancelled_save = self.save_debounce.cancel(scheduler);
        self.selection_frame.cancel(scheduler);
        if let Some(open) = self.open.take() {
            debug!(
                "event=section_close module=session section={} cancelled_save={cancelled_save}",
                open.key
            );
        }
        self.save_cycle = SaveCycle::Idle;
    }

    pub fn section(&self) -> Option<&SectionKey> {
        self.open.as_ref().map(|open| &open.key)
    }

    pub fn editors(&self) -> Option<&EditorSet> {
        self.open.as_ref().map(|open| &open.editors)
    }

    /// Live editor of the open section for `slot`.
    pub fn editor(&self, slot: SlotName) -> Option<EditorHandle> {
        self.editors().and_then(|editors| editors.live(slot)).cloned()
    }

    pub fn save_cycle(&self) -> SaveCycle {
        self.save_cycle
    }

    /// Pushes stored content into every bound editor of the open section.
    pub fn restore(&mut self) -> Vec<(SlotName, RestoreOutcome)> {
        let Some(open) = self.open.as_mut() else {
            return Vec::new();
        };
        let (content, revision) = {
            let store = self.store.borrow();
            (store.item_content(&open.key), store.section_revision(&open.key))
        };
        open.observed_revision = revision;

        open.editors
            .kind()
            .slots()
            .iter()
            .map(|slot| {
                let incoming = content.get(*slot).and_then(SlotContent::to_document);
                let outcome = match open.editors.live(*slot) {
                    None => RestoreOutcome::Skipped,
                    Some(editor) => match restore_editor(editor.as_ref(), incoming.as_ref()) {
                        Ok(outcome) => outcome,
                        Err(err) => {
                            error!(
                                "event=slot_restore module=session status=error section={} slot={slot} error={err}",
                                open.key
                            );
                            RestoreOutcome::Failed
                        }
                    },
                };
                (*slot, outcome)
            })
            .collect()
    }

    /// Restores only when the store changed since the last restore.
    pub fn restore_if_changed(&mut self) -> Option<Vec<(SlotName, RestoreOutcome)>> {
        let open = self.open.as_ref()?;
        let revision = self.store.borrow().section_revision(&open.key);
        if revision == open.observed_revision {
            return None;
        }
        Some(self.restore())
    }

    /// Handles an update event from the editor bound to `slot`.
    ///
    /// Captures all selections, writes every slot to the store, re-arms the
    /// save debounce and requests a selection-restore frame. Returns `false`
    /// when the event does not belong to the open section.
    pub fn handle_edit(&mut self, slot: SlotName, scheduler: &mut Scheduler<SessionTask>) -> bool {
        let Some(open) = self.open.as_ref() else {
            debug!("event=slot_edit module=session status=ignored reason=no_section slot={slot}");
            return false;
        };
        if open.editors.live(slot).is_none() {
            debug!(
                "event=slot_edit module=session status=ignored reason=unbound section={} slot={slot}",
                open.key
            );
            return false;
        }

        let snapshots: BTreeMap<SlotName, SelectionSnapshot> = open
            .editors
            .iter()
            .filter(|(_, editor)| !editor.is_destroyed())
            .filter_map(|(slot, editor)| editor.selection().ok().map(|selection| (slot, selection)))
            .collect();

        let patch = collect_patch(&open.editors);
        let key = open.key.clone();
        if let Err(err) = self.store.borrow_mut().update_item_content(&key, patch) {
            error!("event=slot_write module=session status=error section={key} error={err}");
        }

        self.save_debounce.arm(
            scheduler,
            SessionTask::RemoteSave {
                section: key.clone(),
            },
        );
        self.save_cycle = SaveCycle::PendingSave;
        self.selection_frame.replace(
            scheduler,
            SessionTask::RestoreSelection {
                section: key,
                snapshots,
            },
        );
        true
    }

    /// Runs the debounced remote save fired under `handle`.
    pub fn run_remote_save(&mut self, handle: TimerHandle, section: &SectionKey) {
        if !self.save_debounce.complete(handle) {
            debug!("event=remote_save module=session status=superseded section={section}");
            return;
        }
        if self.section() != Some(section) {
            debug!("event=remote_save module=session status=skipped reason=section_closed section={section}");
            return;
        }
        let plan_id = self.store.borrow().plan_id();
        let Some(plan_id) = plan_id else {
            debug!("event=remote_save module=session status=skipped reason=no_plan section={section}");
            self.save_cycle = SaveCycle::Idle;
            return;
        };

        self.save_cycle = SaveCycle::Saving;
        let result = self.store.borrow_mut().save_all_items(plan_id);
        self.save_cycle = match result {
            Ok(()) => {
                info!("event=remote_save module=session status=ok section={section} plan_id={plan_id}");
                SaveCycle::Idle
            }
            Err(err) => {
                warn!("event=remote_save module=session status=error section={section} error={err}");
                SaveCycle::SaveFailed
            }
        };
    }

    /// Re-applies the selection captured before the last write.
    ///
    /// Targets the last-focused editor, falling back to the primary one.
    pub fn restore_selection(
        &mut self,
        handle: FrameHandle,
        section: &SectionKey,
        snapshots: &BTreeMap<SlotName, SelectionSnapshot>,
        tracker: &ActiveEditorTracker,
    ) {
        if !self.selection_frame.complete(handle) {
            return;
        }
        let Some(open) = self.open.as_ref() else {
            return;
        };
        if &open.key != section {
            return;
        }

        let target = tracker
            .active()
            .filter(|(slot, _)| open.editors.live(*slot).is_some())
            .or_else(|| {
                let slot = open.editors.kind().primary_slot();
                open.editors.primary().map(|editor| (slot, editor.clone()))
            });
        let Some((slot, editor)) = target else {
            return;
        };
        let Some(snapshot) = snapshots.get(&slot) else {
            return;
        };
        if let Err(err) = editor.focus().and_then(|()| editor.set_selection(*snapshot)) {
            debug!("event=selection_restore module=session status=error slot={slot} error={err}");
        }
    }

    /// Releases editors and pending work; later events are ignored.
    pub fn teardown(&mut self, scheduler: &mut Scheduler<SessionTask>) {
        self.close(scheduler);
    }
}

fn restore_editor(editor: &dyn EditorEngine, incoming: Option<&DocNode>) -> EditorResult<RestoreOutcome> {
    let current = editor.document()?;
    match incoming {
        Some(next) => {
            if current.canonical_json()? == next.canonical_json()? {
                return Ok(RestoreOutcome::Unchanged);
            }
            editor.replace_content(next)?;
            Ok(RestoreOutcome::Replaced)
        }
        None if current.is_empty_document() => Ok(RestoreOutcome::Unchanged),
        None => {
            editor.clear_content()?;
            Ok(RestoreOutcome::Cleared)
        }
    }
}

/// Builds the write-back patch for every slot of the section.
///
/// Unbound slots are written absent. A bound editor that is destroyed or
/// cannot serialize is left out so its stored value survives.
fn collect_patch(editors: &EditorSet) -> SlotPatch {
    let kind: SectionKind = editors.kind();
    kind.slots()
        .iter()
        .filter_map(|slot| match editors.get(*slot) {
            None => Some((*slot, None)),
            Some(editor) if editor.is_destroyed() => None,
            Some(editor) => editor
                .document()
                .ok()
                .map(|doc| (*slot, Some(SlotContent::Doc(doc)))),
        })
        .collect()
}
