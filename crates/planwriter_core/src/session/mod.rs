//! Editing session over one plan.

pub mod editor_set;
pub mod synchronizer;
pub mod task;
pub mod tracker;
pub mod write_session;
