use planwriter_core::db::open_db;
use planwriter_core::{
    DocumentStore, EditorEngine, EditorEvent, EditorSet, MemoryEditor, PlanId, RecordingNotifier,
    SectionKey, SectionKind, SessionConfig, SlotContent, SlotName, SqlitePlanRepository,
    WriteSession,
};
use std::cell::RefCell;
use std::rc::Rc;

fn section(key: &str) -> SectionKey {
    SectionKey::new(key).expect("valid section key")
}

#[test]
fn debounced_save_persists_every_section_to_sqlite() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("plans.db");
    let plan_id = PlanId::new_v4();

    let repo = SqlitePlanRepository::new(open_db(&path).expect("open db"));
    let store = Rc::new(RefCell::new(DocumentStore::new(Box::new(repo))));
    store.borrow_mut().set_plan_id(Some(plan_id));
    let mut session = WriteSession::new(
        store.clone(),
        Rc::new(RecordingNotifier::new()),
        SessionConfig::default(),
    )
    .expect("session");

    let content = MemoryEditor::shared(SlotName::Content);
    let editors = EditorSet::new(SectionKind::General)
        .with(SlotName::Content, content.clone())
        .expect("bind");
    session
        .open_section(section("2"), "Market", editors)
        .expect("open");
    content.type_text("Market size").expect("type");
    session.dispatch(SlotName::Content, EditorEvent::Update);

    let features = MemoryEditor::shared(SlotName::Features);
    let editors = EditorSet::new(SectionKind::Overview)
        .with(SlotName::Features, features.clone())
        .expect("bind");
    session
        .open_section(SectionKey::overview(), "Overview", editors)
        .expect("open");
    features.type_text("Offline first").expect("type");
    session.dispatch(SlotName::Features, EditorEvent::Update);
    session.advance(300);
    session.teardown();

    let reopened = SqlitePlanRepository::new(open_db(&path).expect("reopen db"));
    assert_eq!(reopened.save_count(plan_id).expect("save count"), 1);

    let mut restored = DocumentStore::new(Box::new(reopened));
    restored.load_plan(plan_id).expect("load plan");
    assert_eq!(restored.plan_id(), Some(plan_id));

    let text = |key: &SectionKey, slot: SlotName| {
        restored
            .item_content(key)
            .get(slot)
            .and_then(SlotContent::to_document)
            .map(|doc| doc.plain_text())
    };
    assert_eq!(text(&section("2"), SlotName::Content).as_deref(), Some("Market size"));
    assert_eq!(
        text(&SectionKey::overview(), SlotName::Features).as_deref(),
        Some("Offline first")
    );
}

#[test]
fn loaded_plan_restores_into_fresh_editors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("plans.db");
    let plan_id = PlanId::new_v4();

    {
        let repo = SqlitePlanRepository::new(open_db(&path).expect("open db"));
        let mut store = DocumentStore::new(Box::new(repo));
        store.set_plan_id(Some(plan_id));
        let mut patch = std::collections::BTreeMap::new();
        patch.insert(SlotName::Content, Some(SlotContent::LegacyText("legacy body".into())));
        store
            .update_item_content(&section("4"), patch)
            .expect("update");
        store.save_all_items(plan_id).expect("save");
    }

    let repo = SqlitePlanRepository::new(open_db(&path).expect("reopen db"));
    let store = Rc::new(RefCell::new(DocumentStore::new(Box::new(repo))));
    store.borrow_mut().load_plan(plan_id).expect("load");
    let mut session = WriteSession::new(
        store,
        Rc::new(RecordingNotifier::new()),
        SessionConfig::default(),
    )
    .expect("session");

    let editor = MemoryEditor::shared(SlotName::Content);
    let editors = EditorSet::new(SectionKind::General)
        .with(SlotName::Content, editor.clone())
        .expect("bind");
    session
        .open_section(section("4"), "Finance", editors)
        .expect("open");

    assert_eq!(editor.plain_text().expect("text"), "legacy body");
    assert_eq!(editor.replace_count(), 1);
}
