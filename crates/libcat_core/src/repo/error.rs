//! Repository error taxonomy.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use crate::model::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse failure category reported to the UI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Constraint,
    Connection,
    Statement,
    NotFound,
    InternalConsistency,
    InvalidState,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Constraint => "constraint",
            Self::Connection => "connection",
            Self::Statement => "statement",
            Self::NotFound => "not_found",
            Self::InternalConsistency => "internal_consistency",
            Self::InvalidState => "invalid_state",
        }
    }
}

/// Error for entity and relationship repository operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// Update or delete addressed an identifier that does not exist.
    NotFound { kind: &'static str, id: EntityId },
    /// Delete refused because assignment rows still reference the entity.
    Restricted {
        kind: &'static str,
        id: EntityId,
        table: &'static str,
        references: usize,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Db(DbError::Connection(_)) => ErrorKind::Connection,
            Self::Db(DbError::Constraint(_)) => ErrorKind::Constraint,
            Self::Db(DbError::Statement(_) | DbError::UnsupportedSchemaVersion { .. }) => {
                ErrorKind::Statement
            }
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Restricted { .. } => ErrorKind::Constraint,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Restricted {
                kind,
                id,
                table,
                references,
            } => write!(
                f,
                "{kind} {id} is still referenced by {references} row(s) in `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Restricted { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::from(value))
    }
}
