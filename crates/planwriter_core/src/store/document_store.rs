//! Per-plan document store.
//!
//! # Responsibility
//! - Hold the in-memory content of every section of the open plan.
//! - Apply synchronous slot updates from the editors.
//! - Push all sections to the persistence backend on `save_all_items`.
//!
//! # Invariants
//! - In-memory content is the user-visible truth; a failed save never rolls
//!   it back.
//! - `SaveState` is only mutated by `save_all_items`.
//! - Each section carries a revision that increases on every accepted update.
//!
//! The store is created per editing session and shared with the session as
//! `Rc<RefCell<DocumentStore>>`.

use crate::model::section::{SectionContent, SectionKey, SlotPatch};
use crate::model::ModelError;
use crate::store::plan_repo::{PlanId, PlanRepository, RepoError};
use crate::store::save_state::{now_epoch_ms, SaveState};
use log::{error, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Store-level error.
#[derive(Debug)]
pub enum StoreError {
    /// Slot update rejected by the section model.
    Model(ModelError),
    /// Persistence backend failure.
    Repo(RepoError),
    /// `save_all_items` was asked to save a plan other than the loaded one.
    PlanMismatch { expected: Option<PlanId>, actual: PlanId },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::PlanMismatch { expected, actual } => match expected {
                Some(expected) => write!(f, "store holds plan {expected}, not {actual}"),
                None => write!(f, "store holds no plan, asked to save {actual}"),
            },
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::PlanMismatch { .. } => None,
        }
    }
}

impl From<ModelError> for StoreError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

#[derive(Debug, Clone, Default)]
struct SectionEntry {
    content: SectionContent,
    revision: u64,
}

/// In-memory plan content with a persistence backend.
pub struct DocumentStore {
    plan_id: Option<PlanId>,
    sections: BTreeMap<SectionKey, SectionEntry>,
    save_state: SaveState,
    repo: Box<dyn PlanRepository>,
}

impl DocumentStore {
    /// Creates an empty store without a plan identity.
    pub fn new(repo: Box<dyn PlanRepository>) -> Self {
        Self {
            plan_id: None,
            sections: BTreeMap::new(),
            save_state: SaveState::default(),
            repo,
        }
    }

    /// Loads persisted sections of `plan_id` and adopts it as the current plan.
    pub fn load_plan(&mut self, plan_id: PlanId) -> Result<(), StoreError> {
        let loaded = self.repo.load_sections(plan_id)?;
        info!(
            "event=plan_load module=store status=ok plan_id={plan_id} sections={}",
            loaded.len()
        );
        self.sections = loaded
            .into_iter()
            .map(|(key, content)| (key, SectionEntry { content, revision: 1 }))
            .collect();
        self.plan_id = Some(plan_id);
        self.save_state = SaveState::default();
        Ok(())
    }

    /// Sets the plan identity without loading (fresh plan).
    pub fn set_plan_id(&mut self, plan_id: Option<PlanId>) {
        self.plan_id = plan_id;
    }

    pub fn plan_id(&self) -> Option<PlanId> {
        self.plan_id
    }

    pub fn save_state(&self) -> &SaveState {
        &self.save_state
    }

    /// Returns the stored content of `key` (empty when never written).
    pub fn item_content(&self, key: &SectionKey) -> SectionContent {
        self.sections
            .get(key)
            .map(|entry| entry.content.clone())
            .unwrap_or_default()
    }

    /// Revision of `key`, 0 when the section was never written.
    pub fn section_revision(&self, key: &SectionKey) -> u64 {
        self.sections.get(key).map_or(0, |entry| entry.revision)
    }

    /// Merges `patch` into section `key` synchronously.
    ///
    /// # Errors
    /// - `StoreError::Model` when the patch names a slot outside the section kind.
    pub fn update_item_content(&mut self, key: &SectionKey, patch: SlotPatch) -> Result<(), StoreError> {
        let entry = self.sections.entry(key.clone()).or_default();
        entry.content.apply_patch(key.kind(), patch)?;
        entry.revision += 1;
        Ok(())
    }

    /// Persists every section of `plan_id` through the backend.
    ///
    /// # Side effects
    /// - `is_saving` is set only for the duration of the backend call. The
    ///   call is synchronous, so it is `false` again when this returns.
    /// - On success `last_saved_at_ms` is refreshed and `last_error` cleared.
    /// - On failure `last_error` is recorded; in-memory content is untouched.
    pub fn save_all_items(&mut self, plan_id: PlanId) -> Result<(), StoreError> {
        if self.plan_id != Some(plan_id) {
            return Err(StoreError::PlanMismatch {
                expected: self.plan_id,
                actual: plan_id,
            });
        }

        let started_at = Instant::now();
        self.save_state.is_saving = true;
        let snapshot: BTreeMap<SectionKey, SectionContent> = self
            .sections
            .iter()
            .map(|(key, entry)| (key.clone(), entry.content.clone()))
            .collect();
        let result = self.repo.save_sections(plan_id, &snapshot);
        self.save_state.is_saving = false;

        match result {
            Ok(()) => {
                self.save_state.last_saved_at_ms = Some(now_epoch_ms());
                self.save_state.last_error = None;
                info!(
                    "event=plan_save module=store status=ok plan_id={plan_id} sections={} duration_ms={}",
                    snapshot.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=plan_save module=store status=error plan_id={plan_id} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                self.save_state.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }
}
