//! Autosave status owned by the document store.

use chrono::{DateTime, FixedOffset, Utc};

/// Offset used for the "last saved" label (KST, UTC+9).
const LABEL_UTC_OFFSET_SECS: i32 = 9 * 60 * 60;

/// Remote-save status shown next to the editor toolbar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveState {
    /// Unix epoch milliseconds of the last successful save.
    pub last_saved_at_ms: Option<i64>,
    pub is_saving: bool,
    /// Message of the most recent failed save, cleared on success.
    pub last_error: Option<String>,
}

impl SaveState {
    /// Toolbar label: `Saving...`, `Saved YY.MM.DD HH:MM`, or empty.
    pub fn status_label(&self) -> String {
        if self.is_saving {
            return "Saving...".to_string();
        }
        match self.last_saved_at_ms.and_then(format_saved_time) {
            Some(formatted) => format!("Saved {formatted}"),
            None => String::new(),
        }
    }
}

/// Formats epoch milliseconds as `YY.MM.DD HH:MM` in KST.
///
/// Returns `None` for timestamps chrono cannot represent.
pub fn format_saved_time(epoch_ms: i64) -> Option<String> {
    let offset = FixedOffset::east_opt(LABEL_UTC_OFFSET_SECS)?;
    let utc: DateTime<Utc> = DateTime::from_timestamp_millis(epoch_ms)?;
    Some(utc.with_timezone(&offset).format("%y.%m.%d %H:%M").to_string())
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
