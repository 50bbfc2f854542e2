//! User-visible failure notices.
//!
//! Only user-initiated actions (spell-check, image insertion) raise notices;
//! background work (restore, autosave) fails silently into the log.

use log::warn;
use std::cell::RefCell;

pub const SPELL_CHECK_FAILED: &str = "Spell check failed. Please try again in a moment.";
pub const IMAGE_UPLOAD_FAILED: &str = "Image upload failed. Please try again.";
pub const IMAGE_TYPE_REJECTED: &str = "Only image files can be uploaded.";

/// Host hook that shows a message to the user (alert, toast, ...).
pub trait UserNotifier {
    fn notify(&self, message: &str);
}

/// Notifier for headless hosts: writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl UserNotifier for LogNotifier {
    fn notify(&self, message: &str) {
        warn!("event=user_notice module=session status=shown message={message:?}");
    }
}

/// Notifier that keeps every message, for hosts that render them later.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Drains recorded messages.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }
}

impl UserNotifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
