//! SQLite storage for persisted plans.
//!
//! # Responsibility
//! - Open plan databases with the pragmas the plan repository relies on.
//! - Keep the schema current through ordered migrations.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - No plan data is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type PlanDbResult<T> = Result<T, PlanDbError>;

/// Failure to open or upgrade a plan database.
#[derive(Debug)]
pub enum PlanDbError {
    /// The connection itself could not be established.
    Open {
        mode: &'static str,
        source: rusqlite::Error,
    },
    /// A statement outside a specific migration failed.
    Sqlite(rusqlite::Error),
    /// Migration `version` failed; the upgrade was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl PlanDbError {
    /// Short code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "plan_db_open_failed",
            Self::Sqlite(_) => "plan_db_sqlite_failed",
            Self::Migration { .. } => "plan_db_migration_failed",
            Self::SchemaTooNew { .. } => "plan_db_schema_too_new",
        }
    }
}

impl Display for PlanDbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, source } => write!(f, "cannot open {mode} plan database: {source}"),
            Self::Sqlite(err) => write!(f, "plan database error: {err}"),
            Self::Migration { version, source } => {
                write!(f, "plan schema migration {version} failed: {source}")
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "plan database uses schema {found}; this build reads up to {supported}"
            ),
        }
    }
}

impl Error for PlanDbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for PlanDbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
