//! Per-kind configuration consumed by the generic entity repository.

use super::validation::ValidationError;
use super::EntityId;
use rusqlite::types::Value;
use rusqlite::Row;
use std::fmt::Debug;

/// Static table layout for one entity kind.
///
/// Every string here is compiled into the binary; none of it ever comes
/// from user input, so it is safe to splice into SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySpec {
    /// Singular kind name used in errors and log events.
    pub kind: &'static str,
    /// Human-readable kind name used as a column header.
    pub label: &'static str,
    pub table: &'static str,
    /// Writable attribute columns, in `Entity::draft_values` order.
    pub columns: &'static [&'static str],
    /// Column holding the human-readable name used for lookups.
    pub display_column: &'static str,
    /// Base `SELECT ... FROM ...` including any read-time joins.
    pub select_sql: &'static str,
    /// Identifier column as it must be referenced inside `select_sql`.
    pub id_column: &'static str,
    /// Presentation column headers, identifier first.
    pub headers: &'static [&'static str],
}

/// Pre-write validation for drafts.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// One catalog object stored in a single table with a generated id.
pub trait Entity: Clone + Debug + PartialEq {
    /// Attribute set accepted by create/update.
    type Draft: Validate + Debug;

    const SPEC: EntitySpec;

    fn id(&self) -> EntityId;

    fn display_name(&self) -> &str;

    /// Builds one entity from a row produced by `SPEC.select_sql`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Bind values for `SPEC.columns`, in the same order.
    fn draft_values(draft: &Self::Draft) -> Vec<Value>;
}
