//! SQLite persistence gateway, connection providers and schema bootstrap.
//!
//! # Responsibility
//! - Hand out one scoped connection per store operation.
//! - Apply schema migrations in deterministic order before first use.
//! - Classify SQLite failures into connection/constraint/statement errors.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Every connection handed to callers has `foreign_keys=ON`.
//! - No connection outlives the gateway call that acquired it.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod gateway;
pub mod migrations;
mod provider;

pub use gateway::Gateway;
pub use provider::{ConnectionProvider, FileConnectionProvider, MemoryConnectionProvider};

pub type DbResult<T> = Result<T, DbError>;

/// Store-level failure, classified by what the caller can do about it.
#[derive(Debug)]
pub enum DbError {
    /// Store could not be opened or reached.
    Connection(rusqlite::Error),
    /// Store rejected a write (NOT NULL, CHECK, FOREIGN KEY, ...).
    Constraint(rusqlite::Error),
    /// Malformed statement or any other SQLite failure.
    Statement(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Wraps an error raised while acquiring a connection.
    pub(crate) fn connection(err: rusqlite::Error) -> Self {
        Self::Connection(err)
    }

    /// Short stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "db_connection",
            Self::Constraint(_) => "db_constraint",
            Self::Statement(_) => "db_statement",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "store unreachable: {err}"),
            Self::Constraint(err) => write!(f, "store rejected write: {err}"),
            Self::Statement(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) | Self::Constraint(err) | Self::Statement(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        match value.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Self::Constraint(value),
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::PermissionDenied
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure,
            ) => Self::Connection(value),
            _ => Self::Statement(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use rusqlite::Connection;

    #[test]
    fn constraint_violations_are_classified_as_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL);")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t (name) VALUES (NULL);", [])
            .unwrap_err();
        assert!(matches!(DbError::from(err), DbError::Constraint(_)));
    }

    #[test]
    fn syntax_errors_are_classified_as_statement() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.execute("SELEC nothing;", []).unwrap_err();
        let classified = DbError::from(err);
        assert!(matches!(classified, DbError::Statement(_)));
        assert_eq!(classified.code(), "db_statement");
    }
}
