//! Editor engine boundary.
//!
//! # Responsibility
//! - Define the capability trait the core drives editors through.
//! - Provide per-slot configuration and a headless engine implementation.

pub mod config;
pub mod engine;
pub mod memory;
