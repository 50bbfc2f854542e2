//! Spell-check service contract and payload types.
//!
//! # Responsibility
//! - Define the request built from the active editors' plain text.
//! - Define the raw response shape and map it into correction items.
//!
//! # Invariants
//! - Correction offsets are char offsets into the slot text that was sent.
//! - Mapped items with an empty or inverted range are dropped.

use crate::model::section::SlotName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Spell-check request for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellCheckRequest {
    pub section_id: String,
    pub title: String,
    /// Empty for general sections.
    pub item_name: String,
    /// Empty for general sections.
    pub one_line_intro: String,
    /// Plain text of each spell-checked slot.
    pub slots: BTreeMap<SlotName, String>,
}

/// One correction as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCorrection {
    pub slot: SlotName,
    pub start: usize,
    pub end: usize,
    pub original: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Service response envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SpellCheckResponse {
    #[serde(default)]
    pub corrections: Vec<RawCorrection>,
}

/// Correction item held by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellCheckItem {
    /// Stable within one response: `<slot>-<index>`.
    pub id: String,
    pub slot: SlotName,
    pub from: usize,
    pub to: usize,
    pub original: String,
    pub suggestions: Vec<String>,
    pub reason: Option<String>,
}

/// Spell-check transport or decoding failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpellCheckError {
    Transport(String),
    InvalidResponse(String),
}

impl Display for SpellCheckError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "spell-check request failed: {message}"),
            Self::InvalidResponse(message) => write!(f, "spell-check response invalid: {message}"),
        }
    }
}

impl Error for SpellCheckError {}

/// Stateless request/response spell-check collaborator.
pub trait SpellCheckService {
    fn check(&self, request: &SpellCheckRequest) -> Result<SpellCheckResponse, SpellCheckError>;
}

/// Maps a raw response into correction items ordered by slot and offset.
pub fn map_spell_response(response: SpellCheckResponse) -> Vec<SpellCheckItem> {
    let mut items: Vec<SpellCheckItem> = response
        .corrections
        .into_iter()
        .filter(|raw| raw.end > raw.start)
        .enumerate()
        .map(|(index, raw)| SpellCheckItem {
            id: format!("{}-{index}", raw.slot),
            slot: raw.slot,
            from: raw.start,
            to: raw.end,
            original: raw.original,
            suggestions: raw.suggestions,
            reason: raw.reason,
        })
        .collect();
    items.sort_by(|a, b| (a.slot, a.from, a.to).cmp(&(b.slot, b.from, b.to)));
    items
}
