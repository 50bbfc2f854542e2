//! Core of the business-plan writing workspace.
//!
//! Keeps several rich-text editors in sync with a per-plan document store,
//! debounces remote saves, orchestrates spell-check highlighting and tracks
//! the editor that receives inserted images. The UI toolkit plugs in through
//! the `EditorEngine` trait.

pub mod config;
pub mod db;
pub mod editor;
pub mod images;
pub mod logging;
pub mod model;
pub mod notice;
pub mod runtime;
pub mod session;
pub mod spellcheck;
pub mod store;

pub use config::{ConfigError, SessionConfig};
pub use editor::engine::{EditorEngine, EditorError, EditorEvent, EditorHandle, Highlight, ImageAttributes};
pub use editor::memory::MemoryEditor;
pub use images::{clamp_to_max_width, ClipboardItem, ImageBlob, ImageUploadService, UploadError};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::document::{DocNode, SlotContent};
pub use model::section::{SectionContent, SectionKey, SectionKind, SlotName};
pub use notice::{LogNotifier, RecordingNotifier, UserNotifier};
pub use session::editor_set::EditorSet;
pub use session::synchronizer::{RestoreOutcome, SaveCycle};
pub use session::write_session::{SessionError, WriteSession};
pub use spellcheck::service::{SpellCheckError, SpellCheckItem, SpellCheckRequest, SpellCheckResponse, SpellCheckService};
pub use store::document_store::{DocumentStore, StoreError};
pub use store::plan_repo::{PlanId, PlanRepository, RepoError, SqlitePlanRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
