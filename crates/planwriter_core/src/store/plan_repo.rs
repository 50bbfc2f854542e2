//! Plan persistence contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist every section of a plan as one serialized JSON row.
//! - Load a plan's sections back for a new editing session.
//!
//! # Invariants
//! - `save_sections` writes all sections of one call in a single transaction.
//! - Rows that fail to parse or violate their section kind are rejected on
//!   read instead of being masked.

use crate::db::PlanDbError;
use crate::model::section::{SectionContent, SectionKey};
use crate::model::ModelError;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one business plan.
pub type PlanId = Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for plan save/load operations.
#[derive(Debug)]
pub enum RepoError {
    Db(PlanDbError),
    Serialization(serde_json::Error),
    InvalidData(String),
    /// Backend refused the write (remote or transport failure).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "section serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted plan data: {message}"),
            Self::Unavailable(message) => write!(f, "plan storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<PlanDbError> for RepoError {
    fn from(value: PlanDbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(PlanDbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<ModelError> for RepoError {
    fn from(value: ModelError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Remote-save target behind the document store.
pub trait PlanRepository {
    /// Upserts every given section of the plan.
    fn save_sections(
        &mut self,
        plan_id: PlanId,
        sections: &BTreeMap<SectionKey, SectionContent>,
    ) -> RepoResult<()>;

    /// Loads all persisted sections of the plan (empty for unknown plans).
    fn load_sections(&self, plan_id: PlanId) -> RepoResult<BTreeMap<SectionKey, SectionContent>>;
}

/// SQLite-backed plan repository owning its connection.
pub struct SqlitePlanRepository {
    conn: Connection,
}

impl SqlitePlanRepository {
    /// Wraps a migrated connection (see `db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Number of completed saves recorded for `plan_id`.
    pub fn save_count(&self, plan_id: PlanId) -> RepoResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM plan_saves WHERE plan_uuid = ?1;",
            params![plan_id.to_string()],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

impl PlanRepository for SqlitePlanRepository {
    fn save_sections(
        &mut self,
        plan_id: PlanId,
        sections: &BTreeMap<SectionKey, SectionContent>,
    ) -> RepoResult<()> {
        let plan_uuid = plan_id.to_string();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO plans (uuid) VALUES (?1)
             ON CONFLICT(uuid) DO UPDATE SET updated_at = (strftime('%s', 'now') * 1000);",
            params![plan_uuid],
        )?;

        for (key, content) in sections {
            let content_json = serde_json::to_string(content)?;
            tx.execute(
                "INSERT INTO plan_sections (plan_uuid, section_key, content_json)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(plan_uuid, section_key) DO UPDATE SET
                    content_json = excluded.content_json,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![plan_uuid, key.as_str(), content_json],
            )?;
        }

        tx.execute(
            "INSERT INTO plan_saves (plan_uuid, section_count, saved_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000));",
            params![plan_uuid, sections.len() as i64],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn load_sections(&self, plan_id: PlanId) -> RepoResult<BTreeMap<SectionKey, SectionContent>> {
        let mut stmt = self.conn.prepare(
            "SELECT section_key, content_json
             FROM plan_sections
             WHERE plan_uuid = ?1
             ORDER BY section_key ASC;",
        )?;
        let mut rows = stmt.query(params![plan_id.to_string()])?;

        let mut sections = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let raw_key: String = row.get(0)?;
            let content_json: String = row.get(1)?;
            let key = SectionKey::new(&raw_key)?;
            let content: SectionContent = serde_json::from_str(&content_json)?;
            content.validate_for(key.kind())?;
            sections.insert(key, content);
        }
        Ok(sections)
    }
}
