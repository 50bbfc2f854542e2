//! Spell-check orchestration.

pub mod highlight;
pub mod orchestrator;
pub mod service;
