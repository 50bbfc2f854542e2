//! Document store and its persistence backend.
//!
//! # Responsibility
//! - Own the writer-of-record for section content.
//! - Keep persistence details behind `PlanRepository`.

pub mod document_store;
pub mod plan_repo;
pub mod save_state;
