//! Input validation shared by every catalog draft.
//!
//! # Invariants
//! - Validation never touches the store.
//! - Text attributes are trimmed; blank text counts as absent.

use super::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Missing or malformed input, detected before any store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required attribute is empty or absent.
    MissingField(&'static str),
    /// Numeric attribute could not be parsed as an integer.
    NotANumber { field: &'static str, value: String },
    /// Numeric attribute parsed but is below zero.
    Negative { field: &'static str, value: i64 },
    /// Display name does not match any row of the referenced kind.
    UnresolvedReference { kind: &'static str, name: String },
    /// Display name matches more than one row of the referenced kind.
    AmbiguousReference {
        kind: &'static str,
        name: String,
        matches: usize,
    },
    /// Identifier does not exist in the referenced table.
    UnknownReference { kind: &'static str, id: EntityId },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "`{field}` must not be empty"),
            Self::NotANumber { field, value } => {
                write!(f, "`{field}` must be a whole number, got `{value}`")
            }
            Self::Negative { field, value } => {
                write!(f, "`{field}` must not be negative, got {value}")
            }
            Self::UnresolvedReference { kind, name } => write!(f, "no {kind} named `{name}`"),
            Self::AmbiguousReference {
                kind,
                name,
                matches,
            } => write!(f, "{matches} {kind} rows are named `{name}`"),
            Self::UnknownReference { kind, id } => write!(f, "{kind} {id} does not exist"),
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when nothing is left.
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Parses raw form text as a non-negative integer.
pub fn parse_non_negative(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    let value = trimmed
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: trimmed.to_string(),
        })?;
    require_non_negative(field, value)
}

pub fn require_non_negative(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}
