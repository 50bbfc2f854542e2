use planwriter_core::model::selection::SelectionSnapshot;
use planwriter_core::store::plan_repo::RepoResult;
use planwriter_core::{
    DocNode, DocumentStore, EditorEngine, EditorEvent, EditorSet, MemoryEditor, PlanId,
    PlanRepository, RecordingNotifier, RepoError, RestoreOutcome, SaveCycle, SectionContent,
    SectionKey, SectionKind, SessionConfig, SlotContent, SlotName, WriteSession,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

type Snapshot = BTreeMap<SectionKey, SectionContent>;

#[derive(Clone, Default)]
struct CountingRepo {
    saves: Rc<RefCell<Vec<Snapshot>>>,
    offline: Rc<Cell<bool>>,
}

impl PlanRepository for CountingRepo {
    fn save_sections(&mut self, _plan_id: PlanId, sections: &Snapshot) -> RepoResult<()> {
        if self.offline.get() {
            return Err(RepoError::Unavailable("offline".to_string()));
        }
        self.saves.borrow_mut().push(sections.clone());
        Ok(())
    }

    fn load_sections(&self, _plan_id: PlanId) -> RepoResult<Snapshot> {
        Ok(Snapshot::new())
    }
}

struct Harness {
    session: WriteSession,
    store: Rc<RefCell<DocumentStore>>,
    repo: CountingRepo,
}

impl Harness {
    fn new() -> Self {
        let repo = CountingRepo::default();
        let store = Rc::new(RefCell::new(DocumentStore::new(Box::new(repo.clone()))));
        store.borrow_mut().set_plan_id(Some(PlanId::new_v4()));
        let session = WriteSession::new(
            store.clone(),
            Rc::new(RecordingNotifier::new()),
            SessionConfig::default(),
        )
        .expect("default config is valid");
        Self {
            session,
            store,
            repo,
        }
    }

    fn open_general(&mut self, key: &str) -> Rc<MemoryEditor> {
        let editor = MemoryEditor::shared(SlotName::Content);
        let editors = EditorSet::new(SectionKind::General)
            .with(SlotName::Content, editor.clone())
            .expect("content slot belongs to general sections");
        self.session
            .open_section(section(key), format!("Section {key}"), editors)
            .expect("open section");
        editor
    }

    fn seed(&self, key: &str, slot: SlotName, value: SlotContent) {
        let mut patch = BTreeMap::new();
        patch.insert(slot, Some(value));
        self.store
            .borrow_mut()
            .update_item_content(&section(key), patch)
            .expect("seed store");
    }

    fn stored_text(&self, key: &str, slot: SlotName) -> Option<String> {
        self.store
            .borrow()
            .item_content(&section(key))
            .get(slot)
            .and_then(SlotContent::to_document)
            .map(|doc| doc.plain_text())
    }

    fn save_count(&self) -> usize {
        self.repo.saves.borrow().len()
    }
}

fn section(key: &str) -> SectionKey {
    SectionKey::new(key).expect("valid section key")
}

#[test]
fn restore_twice_replaces_content_once() {
    let mut harness = Harness::new();
    harness.seed("1", SlotName::Content, SlotContent::LegacyText("Hello".to_string()));

    let editor = harness.open_general("1");
    let first = editor.document().expect("document").canonical_json().expect("json");
    harness.session.notify_store_changed();
    harness.seed("1", SlotName::Content, SlotContent::LegacyText("Hello".to_string()));
    harness.session.notify_store_changed();

    assert_eq!(editor.replace_count(), 1);
    let second = editor.document().expect("document").canonical_json().expect("json");
    assert_eq!(first, second);
}

#[test]
fn empty_editor_is_not_cleared_for_missing_content() {
    let mut harness = Harness::new();
    let editor = harness.open_general("1");

    assert_eq!(editor.clear_count(), 0);
    assert_eq!(editor.replace_count(), 0);
}

#[test]
fn burst_of_edits_issues_one_save_after_the_last_edit() {
    let mut harness = Harness::new();
    let editor = harness.open_general("1");

    for _ in 0..5 {
        editor.type_text("a").expect("type");
        harness.session.dispatch(SlotName::Content, EditorEvent::Update);
        harness.session.advance(100);
    }
    assert_eq!(harness.session.now_ms(), 500);
    assert_eq!(harness.save_count(), 0);
    assert_eq!(harness.session.save_cycle(), SaveCycle::PendingSave);

    harness.session.advance(199);
    assert_eq!(harness.save_count(), 0);
    harness.session.advance(1);
    assert_eq!(harness.save_count(), 1);
    assert_eq!(harness.session.save_cycle(), SaveCycle::Idle);
    assert!(!harness.session.save_state().is_saving);
    assert!(harness.session.save_state().last_saved_at_ms.is_some());
    assert!(harness.session.save_state().status_label().starts_with("Saved "));

    harness.session.advance(5_000);
    assert_eq!(harness.save_count(), 1);
}

#[test]
fn edit_reaches_the_store_before_the_remote_save() {
    let mut harness = Harness::new();
    let editor = harness.open_general("1");

    editor.type_text("draft").expect("type");
    harness.session.dispatch(SlotName::Content, EditorEvent::Update);

    assert_eq!(harness.stored_text("1", SlotName::Content).as_deref(), Some("draft"));
    assert_eq!(harness.save_count(), 0);
    assert_eq!(editor.replace_count(), 0);
}

#[test]
fn caret_survives_a_restore_round_trip() {
    let mut harness = Harness::new();
    harness.seed("1", SlotName::Content, SlotContent::LegacyText("Hello world".to_string()));
    let editor = harness.open_general("1");
    harness.session.dispatch(SlotName::Content, EditorEvent::Focus);

    editor.set_selection(SelectionSnapshot::caret(6)).expect("caret after Hello");
    editor.type_text("!").expect("type");
    harness.session.dispatch(SlotName::Content, EditorEvent::Update);

    // Same text split into two runs serializes differently and forces a replace.
    harness.seed(
        "1",
        SlotName::Content,
        SlotContent::Doc(DocNode::doc(vec![DocNode::paragraph(vec![
            DocNode::text("Hello!"),
            DocNode::text(" world"),
        ])])),
    );
    harness.session.notify_store_changed();
    assert_eq!(editor.replace_count(), 2);
    assert_eq!(editor.selection().expect("selection"), SelectionSnapshot::caret(1));

    harness.session.run_frame();
    assert_eq!(editor.selection().expect("selection"), SelectionSnapshot::caret(7));
}

#[test]
fn legacy_string_and_structured_document_restore_identically() {
    let mut harness = Harness::new();
    harness.seed("1", SlotName::Content, SlotContent::LegacyText("Hello".to_string()));
    harness.seed(
        "2",
        SlotName::Content,
        SlotContent::Doc(DocNode::doc(vec![DocNode::paragraph(vec![DocNode::text("Hello")])])),
    );

    let legacy = harness.open_general("1");
    let structured = harness.open_general("2");

    let legacy_doc = legacy.document().expect("document");
    assert_eq!(legacy_doc.children().len(), 1);
    assert_eq!(legacy_doc.plain_text(), "Hello");
    assert_eq!(
        legacy_doc.canonical_json().expect("json"),
        structured.document().expect("document").canonical_json().expect("json")
    );
}

#[test]
fn section_switch_cancels_the_pending_save() {
    let mut harness = Harness::new();
    let first = harness.open_general("1");
    first.type_text("unsaved").expect("type");
    harness.session.dispatch(SlotName::Content, EditorEvent::Update);
    harness.session.advance(100);

    harness.open_general("2");
    assert_eq!(harness.session.pending_timers(), 0);
    harness.session.advance(1_000);

    assert_eq!(harness.save_count(), 0);
    assert_eq!(harness.stored_text("1", SlotName::Content).as_deref(), Some("unsaved"));
}

#[test]
fn save_without_plan_identity_is_skipped() {
    let mut harness = Harness::new();
    harness.store.borrow_mut().set_plan_id(None);
    let editor = harness.open_general("1");

    editor.type_text("x").expect("type");
    harness.session.dispatch(SlotName::Content, EditorEvent::Update);
    harness.session.advance(300);

    assert_eq!(harness.save_count(), 0);
    assert_eq!(harness.session.save_cycle(), SaveCycle::Idle);
    assert_eq!(harness.stored_text("1", SlotName::Content).as_deref(), Some("x"));
}

#[test]
fn failed_save_keeps_content_and_records_the_error() {
    let mut harness = Harness::new();
    harness.repo.offline.set(true);
    let editor = harness.open_general("1");

    editor.type_text("kept").expect("type");
    harness.session.dispatch(SlotName::Content, EditorEvent::Update);
    harness.session.advance(300);

    assert_eq!(harness.session.save_cycle(), SaveCycle::SaveFailed);
    let state = harness.session.save_state();
    assert!(!state.is_saving);
    assert!(state.last_error.is_some());
    assert_eq!(harness.stored_text("1", SlotName::Content).as_deref(), Some("kept"));

    harness.repo.offline.set(false);
    editor.type_text("!").expect("type");
    harness.session.dispatch(SlotName::Content, EditorEvent::Update);
    harness.session.advance(300);
    assert_eq!(harness.save_count(), 1);
    assert!(harness.session.save_state().last_error.is_none());
}

#[test]
fn overview_edit_writes_every_slot() {
    let mut harness = Harness::new();
    harness.seed("0", SlotName::Goals, SlotContent::LegacyText("old goal".to_string()));

    let name = MemoryEditor::shared(SlotName::ItemName);
    let features = MemoryEditor::shared(SlotName::Features);
    let editors = EditorSet::new(SectionKind::Overview)
        .with(SlotName::ItemName, name.clone())
        .and_then(|set| set.with(SlotName::Features, features.clone()))
        .expect("bindings");
    let outcomes = harness
        .session
        .open_section(SectionKey::overview(), "Overview", editors)
        .expect("open overview");
    assert!(outcomes.contains(&(SlotName::Goals, RestoreOutcome::Skipped)));

    name.type_text("Planwriter").expect("type");
    harness.session.dispatch(SlotName::ItemName, EditorEvent::Update);

    assert_eq!(harness.stored_text("0", SlotName::ItemName).as_deref(), Some("Planwriter"));
    assert_eq!(harness.stored_text("0", SlotName::Features).as_deref(), Some(""));
    assert_eq!(harness.stored_text("0", SlotName::Goals), None);
}

#[test]
fn destroyed_sibling_keeps_its_stored_content() {
    let mut harness = Harness::new();
    harness.seed("0", SlotName::Goals, SlotContent::LegacyText("old goal".to_string()));

    let features = MemoryEditor::shared(SlotName::Features);
    let goals = MemoryEditor::shared(SlotName::Goals);
    let editors = EditorSet::new(SectionKind::Overview)
        .with(SlotName::Features, features.clone())
        .and_then(|set| set.with(SlotName::Goals, goals.clone()))
        .expect("bindings");
    harness
        .session
        .open_section(SectionKey::overview(), "Overview", editors)
        .expect("open overview");
    assert_eq!(goals.plain_text().expect("text"), "old goal");

    goals.destroy();
    features.type_text("Offline first").expect("type");
    harness.session.dispatch(SlotName::Features, EditorEvent::Update);

    assert_eq!(harness.stored_text("0", SlotName::Goals).as_deref(), Some("old goal"));
    assert_eq!(
        harness.stored_text("0", SlotName::Features).as_deref(),
        Some("Offline first")
    );

    harness.session.advance(300);
    let saves = harness.repo.saves.borrow();
    let saved_goals = saves[0][&SectionKey::overview()]
        .get(SlotName::Goals)
        .and_then(SlotContent::to_document)
        .map(|doc| doc.plain_text());
    assert_eq!(saved_goals.as_deref(), Some("old goal"));
}

#[test]
fn failing_editor_keeps_its_content_on_restore() {
    let mut harness = Harness::new();
    harness.seed("1", SlotName::Content, SlotContent::LegacyText("from store".to_string()));

    let editor = MemoryEditor::shared(SlotName::Content);
    editor
        .load_document(DocNode::from_plain_text("local draft"))
        .expect("load");
    editor.set_failing(true);
    let editors = EditorSet::new(SectionKind::General)
        .with(SlotName::Content, editor.clone())
        .expect("bind");

    let outcomes = harness
        .session
        .open_section(section("1"), "Section 1", editors)
        .expect("restore failure is not propagated");

    assert_eq!(outcomes, vec![(SlotName::Content, RestoreOutcome::Failed)]);
    assert_eq!(editor.plain_text().expect("text"), "local draft");
    assert_eq!(editor.replace_count(), 0);
    assert_eq!(harness.stored_text("1", SlotName::Content).as_deref(), Some("from store"));
}

#[test]
fn caret_returns_to_primary_editor_without_focus() {
    let mut harness = Harness::new();
    let features = MemoryEditor::shared(SlotName::Features);
    let goals = MemoryEditor::shared(SlotName::Goals);
    let editors = EditorSet::new(SectionKind::Overview)
        .with(SlotName::Features, features.clone())
        .and_then(|set| set.with(SlotName::Goals, goals.clone()))
        .expect("bindings");
    harness
        .session
        .open_section(SectionKey::overview(), "Overview", editors)
        .expect("open overview");
    assert!(harness.session.active_slot().is_none());

    features.type_text("Sync").expect("type");
    goals.type_text("Grow").expect("type");
    harness.session.dispatch(SlotName::Goals, EditorEvent::Update);
    let captured = features.selection().expect("selection");
    assert_eq!(captured, SelectionSnapshot::caret(5));

    features
        .set_selection(SelectionSnapshot::caret(1))
        .expect("move caret away");
    harness.session.run_frame();

    assert_eq!(features.selection().expect("selection"), captured);
    assert_eq!(features.focus_count(), 1);
    assert_eq!(goals.focus_count(), 0);
}

#[test]
fn later_edit_supersedes_the_pending_selection_frame() {
    let mut harness = Harness::new();
    let editor = harness.open_general("1");
    harness.session.dispatch(SlotName::Content, EditorEvent::Focus);
    harness.session.run_frame();
    assert_eq!(harness.session.pending_frames(), 0);

    editor.type_text("ab").expect("type");
    harness.session.dispatch(SlotName::Content, EditorEvent::Update);
    assert_eq!(harness.session.pending_frames(), 1);

    editor.type_text("cd").expect("type");
    harness.session.dispatch(SlotName::Content, EditorEvent::Update);
    assert_eq!(harness.session.pending_frames(), 1);

    editor
        .set_selection(SelectionSnapshot::caret(1))
        .expect("move caret away");
    harness.session.run_frame();

    assert_eq!(editor.selection().expect("selection"), SelectionSnapshot::caret(5));
    assert_eq!(editor.focus_count(), 1);
    assert_eq!(harness.session.pending_frames(), 0);
}

#[test]
fn events_after_teardown_are_ignored() {
    let mut harness = Harness::new();
    let editor = harness.open_general("1");
    editor.type_text("a").expect("type");
    harness.session.dispatch(SlotName::Content, EditorEvent::Update);

    harness.session.teardown();
    assert_eq!(harness.session.pending_timers(), 0);
    assert_eq!(harness.session.pending_frames(), 0);

    editor.type_text("b").expect("type");
    harness.session.dispatch(SlotName::Content, EditorEvent::Update);
    harness.session.advance(1_000);

    assert_eq!(harness.save_count(), 0);
    assert_eq!(harness.stored_text("1", SlotName::Content).as_deref(), Some("a"));
    assert!(harness.session.current_section().is_none());
}

#[test]
fn section_kind_mismatch_is_rejected() {
    let mut harness = Harness::new();
    let editors = EditorSet::new(SectionKind::General)
        .with(SlotName::Content, MemoryEditor::shared(SlotName::Content))
        .expect("bind");
    assert!(harness
        .session
        .open_section(SectionKey::overview(), "Overview", editors)
        .is_err());
}
