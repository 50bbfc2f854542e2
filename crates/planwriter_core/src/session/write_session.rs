//! Write-session facade: one plan, one visible section at a time.
//!
//! # Responsibility
//! - Route editor events to the synchronizer and the focus tracker.
//! - Own the scheduler and run due timers and frame tasks.
//! - Reset spell-check state and pending work on section switches.
//! - Drive image insertion into the active editor.
//!
//! # Invariants
//! - Editor events arriving after `teardown` are ignored.
//! - Background failures (restore, autosave) are logged only; user-initiated
//!   failures (spell-check, image upload) raise one notice each.
//! - Spell items and decorations never carry over to another section.

use crate::config::{ConfigError, SessionConfig};
use crate::editor::engine::{EditorEvent, EditorHandle, ImageAttributes};
use crate::images::{first_image_item, upload_and_insert, ClipboardItem, ImageBlob, ImageUploadService, UploadError};
use crate::model::section::{SectionKey, SectionKind, SlotName};
use crate::notice::{UserNotifier, IMAGE_TYPE_REJECTED, IMAGE_UPLOAD_FAILED};
use crate::runtime::deferred::FrameSlot;
use crate::runtime::scheduler::{DueFrame, Scheduler};
use crate::session::editor_set::EditorSet;
use crate::session::synchronizer::{RestoreOutcome, SaveCycle, SectionSynchronizer};
use crate::session::task::SessionTask;
use crate::session::tracker::ActiveEditorTracker;
use crate::spellcheck::orchestrator::{SpellCheckOrchestrator, SpellCheckTicket};
use crate::spellcheck::service::{SpellCheckError, SpellCheckItem, SpellCheckResponse, SpellCheckService};
use crate::store::document_store::DocumentStore;
use crate::store::save_state::SaveState;
use log::{debug, info};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug)]
pub enum SessionError {
    Config(ConfigError),
    /// Editor set was built for a different section kind than the key.
    KindMismatch { section: SectionKey, expected: SectionKind, actual: SectionKind },
    TornDown,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::KindMismatch {
                section,
                expected,
                actual,
            } => write!(
                f,
                "section {section} expects {expected:?} editors, got {actual:?}"
            ),
            Self::TornDown => write!(f, "write session has been torn down"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

pub struct WriteSession {
    config: SessionConfig,
    store: Rc<RefCell<DocumentStore>>,
    notifier: Rc<dyn UserNotifier>,
    scheduler: Scheduler<SessionTask>,
    synchronizer: SectionSynchronizer,
    spell: SpellCheckOrchestrator,
    tracker: ActiveEditorTracker,
    highlight_frame: FrameSlot,
    title: String,
    torn_down: bool,
}

impl WriteSession {
    /// Creates a session over `store`.
    ///
    /// # Errors
    /// - `SessionError::Config` when `config` fails validation.
    pub fn new(
        store: Rc<RefCell<DocumentStore>>,
        notifier: Rc<dyn UserNotifier>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let synchronizer = SectionSynchronizer::new(store.clone(), config.save_debounce());
        Ok(Self {
            config,
            store,
            notifier,
            scheduler: Scheduler::new(),
            synchronizer,
            spell: SpellCheckOrchestrator::new(),
            tracker: ActiveEditorTracker::new(),
            highlight_frame: FrameSlot::new(),
            title: String::new(),
            torn_down: false,
        })
    }

    /// Shows section `key` with `editors` mounted for its slots.
    ///
    /// Clears spell items and decorations, cancels the outgoing section's
    /// pending save and frame tasks, then restores stored content.
    pub fn open_section(
        &mut self,
        key: SectionKey,
        title: impl Into<String>,
        editors: EditorSet,
    ) -> Result<Vec<(SlotName, RestoreOutcome)>, SessionError> {
        if self.torn_down {
            return Err(SessionError::TornDown);
        }
        if key.kind() != editors.kind() {
            return Err(SessionError::KindMismatch {
                section: key.clone(),
                expected: key.kind(),
                actual: editors.kind(),
            });
        }

        self.spell.reset(self.synchronizer.editors());
        self.spell.reset(Some(&editors));
        self.highlight_frame.cancel(&mut self.scheduler);
        self.tracker.clear();
        self.title = title.into();

        info!(
            "event=section_switch module=session section={key} kind={:?}",
            key.kind()
        );
        let outcomes = self.synchronizer.open(key, editors, &mut self.scheduler);
        self.request_highlights();
        Ok(outcomes)
    }

    /// Routes an event from the editor bound to `slot`.
    pub fn dispatch(&mut self, slot: SlotName, event: EditorEvent) {
        if self.torn_down {
            debug!("event=editor_event module=session status=ignored reason=torn_down slot={slot}");
            return;
        }
        match event {
            EditorEvent::Focus => {
                if let Some(editor) = self.synchronizer.editor(slot) {
                    self.tracker.focus(slot, &editor);
                }
            }
            EditorEvent::Update => {
                if self.synchronizer.handle_edit(slot, &mut self.scheduler) {
                    self.restore_if_changed();
                }
            }
        }
    }

    /// Re-syncs editors after the store was changed outside this session.
    pub fn notify_store_changed(&mut self) {
        if !self.torn_down {
            self.restore_if_changed();
        }
    }

    /// Starts a spell-check run for the open section.
    ///
    /// Returns `None` when no section is open.
    pub fn toggle_spell_check(&mut self) -> Option<SpellCheckTicket> {
        if self.torn_down {
            return None;
        }
        let key = self.synchronizer.section()?.clone();
        let editors = self.synchronizer.editors()?;
        Some(self.spell.begin(&key, &self.title, editors))
    }

    /// Feeds the service result for `ticket` back into the session.
    pub fn complete_spell_check(
        &mut self,
        ticket: &SpellCheckTicket,
        result: Result<SpellCheckResponse, SpellCheckError>,
    ) {
        if self.torn_down {
            return;
        }
        if self.spell.complete(ticket, result, self.notifier.as_ref()) {
            self.request_highlights();
        }
    }

    /// Runs a full spell-check round trip against `service`.
    pub fn run_spell_check(&mut self, service: &dyn SpellCheckService) {
        if let Some(ticket) = self.toggle_spell_check() {
            let result = service.check(&ticket.request);
            self.complete_spell_check(&ticket, result);
        }
    }

    pub fn close_spell_panel(&mut self) {
        self.spell.close_panel();
    }

    /// Prepares image insertion before the file picker opens.
    ///
    /// With no tracked editor, the section's primary editor is focused and
    /// becomes the target. Returns `false` when there is nothing to insert into.
    pub fn begin_image_insert(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        if self.tracker.active().is_some() {
            return true;
        }
        let Some(kind) = self.synchronizer.editors().map(EditorSet::kind) else {
            return false;
        };
        let slot = kind.primary_slot();
        let Some(primary) = self.synchronizer.editor(slot) else {
            return false;
        };
        if let Err(err) = primary.focus() {
            debug!("event=image_target module=session status=error slot={slot} error={err}");
            return false;
        }
        self.tracker.focus(slot, &primary);
        true
    }

    /// Uploads `image` and inserts it into the last-focused editor.
    pub fn insert_image(&mut self, image: &ImageBlob, uploader: &dyn ImageUploadService) -> Option<ImageAttributes> {
        if self.torn_down {
            return None;
        }
        let (_, editor) = self.tracker.active()?;
        self.upload_into(&editor, image, uploader)
    }

    /// Handles a paste into the editor bound to `slot`.
    ///
    /// Returns `true` when the paste carried an image and was consumed.
    pub fn handle_paste(
        &mut self,
        slot: SlotName,
        items: &[ClipboardItem],
        uploader: &dyn ImageUploadService,
    ) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(editor) = self.synchronizer.editor(slot) else {
            return false;
        };
        if !editor.config().intercept_paste {
            return false;
        }
        let Some(image) = first_image_item(items) else {
            return false;
        };
        self.upload_into(&editor, image, uploader);
        true
    }

    /// Moves the clock forward by `ms`, running every timer that comes due.
    pub fn advance(&mut self, ms: u64) {
        let target = self.scheduler.now_ms().saturating_add(ms);
        self.advance_to(target);
    }

    pub fn advance_to(&mut self, target_ms: u64) {
        while let Some(due) = self.scheduler.pop_due(target_ms) {
            match due.task {
                SessionTask::RemoteSave { section } => {
                    self.synchronizer.run_remote_save(due.handle, &section);
                }
                other => debug!("event=timer module=session status=ignored task={other:?}"),
            }
        }
        self.scheduler.settle(target_ms);
    }

    /// Runs the tasks requested for the current animation frame.
    pub fn run_frame(&mut self) {
        for DueFrame { handle, task } in self.scheduler.take_frame() {
            match task {
                SessionTask::RestoreSelection { section, snapshots } => {
                    self.synchronizer
                        .restore_selection(handle, &section, &snapshots, &self.tracker);
                }
                SessionTask::ApplyHighlights { section } => {
                    if !self.highlight_frame.complete(handle) {
                        continue;
                    }
                    if let Some(editors) = self.current_editors_for(&section) {
                        self.spell.apply_highlights(editors);
                    }
                }
                other => debug!("event=frame module=session status=ignored task={other:?}"),
            }
        }
    }

    /// Releases editors and cancels all pending work.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.spell.reset(None);
        self.highlight_frame.cancel(&mut self.scheduler);
        self.synchronizer.teardown(&mut self.scheduler);
        self.tracker.clear();
        self.scheduler.clear();
        self.torn_down = true;
        info!("event=session_teardown module=session status=ok");
    }

    pub fn current_section(&self) -> Option<&SectionKey> {
        self.synchronizer.section()
    }

    pub fn active_slot(&self) -> Option<SlotName> {
        self.tracker.active_slot()
    }

    pub fn active_editor(&self) -> Option<EditorHandle> {
        self.tracker.active().map(|(_, editor)| editor)
    }

    pub fn spell_items(&self) -> &[SpellCheckItem] {
        self.spell.items()
    }

    pub fn is_spell_loading(&self) -> bool {
        self.spell.is_loading()
    }

    pub fn is_spell_checking_active(&self) -> bool {
        self.spell.is_checking_active()
    }

    pub fn is_spell_panel_open(&self) -> bool {
        self.spell.is_panel_open()
    }

    pub fn save_cycle(&self) -> SaveCycle {
        self.synchronizer.save_cycle()
    }

    pub fn save_state(&self) -> SaveState {
        self.store.borrow().save_state().clone()
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_timers()
    }

    pub fn pending_frames(&self) -> usize {
        self.scheduler.pending_frames()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn restore_if_changed(&mut self) {
        let Some(outcomes) = self.synchronizer.restore_if_changed() else {
            return;
        };
        if outcomes.iter().any(|(_, outcome)| outcome.wrote_content()) {
            if let Some(editors) = self.synchronizer.editors() {
                self.spell.discard_items(editors);
            }
        }
    }

    fn request_highlights(&mut self) {
        let Some(section) = self.synchronizer.section().cloned() else {
            return;
        };
        self.highlight_frame
            .replace(&mut self.scheduler, SessionTask::ApplyHighlights { section });
    }

    fn current_editors_for(&self, section: &SectionKey) -> Option<&EditorSet> {
        (self.synchronizer.section() == Some(section))
            .then(|| self.synchronizer.editors())
            .flatten()
    }

    fn upload_into(
        &self,
        editor: &EditorHandle,
        image: &ImageBlob,
        uploader: &dyn ImageUploadService,
    ) -> Option<ImageAttributes> {
        match upload_and_insert(editor.as_ref(), image, uploader, self.config.image_width_padding) {
            Ok(attributes) => Some(attributes),
            Err(UploadError::NotAnImage(_)) => {
                self.notifier.notify(IMAGE_TYPE_REJECTED);
                None
            }
            Err(_) => {
                self.notifier.notify(IMAGE_UPLOAD_FAILED);
                None
            }
        }
    }
}
