//! CLI smoke entry point.
//!
//! # Responsibility
//! - Drive one headless write session end to end against an in-memory plan
//!   database.
//! - Keep output deterministic apart from the save timestamp.

use log::info;
use planwriter_core::db::open_db_in_memory;
use planwriter_core::{
    core_version, init_logging, DocumentStore, EditorEvent, EditorSet, LogLevel, LogNotifier,
    MemoryEditor, PlanId, SectionKey, SectionKind, SessionConfig, SlotName, SqlitePlanRepository,
    WriteSession,
};
use std::cell::RefCell;
use std::error::Error;
use std::process::ExitCode;
use std::rc::Rc;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("planwriter smoke run failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let log_dir = std::env::temp_dir().join("planwriter-cli-logs");
    let log_dir = log_dir.to_str().ok_or("log directory is not valid UTF-8")?;
    init_logging(LogLevel::build_default().as_str(), log_dir)?;
    println!("planwriter_core version={}", core_version());

    let repo = SqlitePlanRepository::new(open_db_in_memory()?);
    let store = Rc::new(RefCell::new(DocumentStore::new(Box::new(repo))));
    store.borrow_mut().set_plan_id(Some(PlanId::new_v4()));

    let config = SessionConfig::default();
    let debounce_ms = config.save_debounce_ms;
    let mut session = WriteSession::new(store.clone(), Rc::new(LogNotifier), config)?;

    let features = MemoryEditor::shared(SlotName::Features);
    let editors = EditorSet::new(SectionKind::Overview)
        .with(SlotName::ItemName, MemoryEditor::shared(SlotName::ItemName))?
        .with(SlotName::Features, features.clone())?;
    session.open_section(SectionKey::overview(), "Overview", editors)?;

    session.dispatch(SlotName::Features, EditorEvent::Focus);
    features.type_text("Headless write session")?;
    session.dispatch(SlotName::Features, EditorEvent::Update);
    session.run_frame();
    session.advance(debounce_ms);

    let label = session.save_state().status_label();
    info!("event=cli_smoke module=cli status=ok save_cycle={:?}", session.save_cycle());
    println!("save_cycle={:?}", session.save_cycle());
    println!("save_label={label}");
    session.teardown();
    Ok(())
}
