//! Single-threaded cooperative runtime primitives.
//!
//! # Responsibility
//! - Model the host UI event loop: timers, animation frames, virtual time.
//! - Provide cancellable debounce and latest-wins frame helpers.
//!
//! # Invariants
//! - Nothing here runs callbacks; due work is handed back to the owner.

pub mod deferred;
pub mod scheduler;
