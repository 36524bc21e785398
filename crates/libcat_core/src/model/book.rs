//! Book entity.
//!
//! # Invariants
//! - `count` and `papers` are never negative.
//! - The author is a nullable reference; its name is joined at read time
//!   and never stored on the book row.

use super::entity::{Entity, EntitySpec, Validate};
use super::validation::{parse_non_negative, require_non_negative, require_text, ValidationError};
use super::EntityId;
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: EntityId,
    pub name: String,
    /// Copies on the shelf.
    pub count: i64,
    /// Page count.
    pub papers: i64,
    pub author_id: Option<EntityId>,
    /// Read-time join of `authors.name`; `None` when unset or dangling.
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub name: String,
    pub count: i64,
    pub papers: i64,
    pub author_id: Option<EntityId>,
}

impl BookDraft {
    pub fn new(name: impl Into<String>, count: i64, papers: i64) -> Self {
        Self {
            name: name.into(),
            count,
            papers,
            author_id: None,
        }
    }

    /// Builds a draft from raw form text, parsing the numeric fields.
    pub fn from_input(name: &str, count: &str, papers: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require_text("name", name)?,
            count: parse_non_negative("count", count)?,
            papers: parse_non_negative("papers", papers)?,
            author_id: None,
        })
    }

    pub fn with_author(mut self, author_id: EntityId) -> Self {
        self.author_id = Some(author_id);
        self
    }
}

/// Raw book form as typed by the user.
///
/// `author: None` means no author was chosen; `Some("")` means the author
/// field was submitted empty and is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookInput<'a> {
    pub name: &'a str,
    pub count: &'a str,
    pub papers: &'a str,
    pub author: Option<&'a str>,
}

impl Validate for BookDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_non_negative("count", self.count)?;
        require_non_negative("papers", self.papers)?;
        Ok(())
    }
}

impl Entity for Book {
    type Draft = BookDraft;

    const SPEC: EntitySpec = EntitySpec {
        kind: "book",
        label: "Book",
        table: "books",
        columns: &["name", "count", "papers", "author_id"],
        display_column: "name",
        select_sql: "SELECT
                b.id AS id,
                b.name AS name,
                b.count AS count,
                b.papers AS papers,
                b.author_id AS author_id,
                a.name AS author_name
             FROM books b
             LEFT JOIN authors a ON a.id = b.author_id",
        id_column: "b.id",
        headers: &["ID", "Name", "Count", "Papers", "Author"],
    };

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            count: row.get("count")?,
            papers: row.get("papers")?,
            author_id: row.get("author_id")?,
            author_name: row.get("author_name")?,
        })
    }

    fn draft_values(draft: &Self::Draft) -> Vec<Value> {
        vec![
            Value::Text(draft.name.trim().to_string()),
            Value::Integer(draft.count),
            Value::Integer(draft.papers),
            draft.author_id.map_or(Value::Null, Value::Integer),
        ]
    }
}
