//! Deferred work the session schedules on its own scheduler.

use crate::model::section::{SectionKey, SlotName};
use crate::model::selection::SelectionSnapshot;
use std::collections::BTreeMap;

/// Payload of a pending timer or frame task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTask {
    /// Debounced remote save for edits made in `section`.
    RemoteSave { section: SectionKey },
    /// Re-apply selections captured before a content write.
    RestoreSelection {
        section: SectionKey,
        snapshots: BTreeMap<SlotName, SelectionSnapshot>,
    },
    /// Re-apply spell-error decorations for `section`.
    ApplyHighlights { section: SectionKey },
}
