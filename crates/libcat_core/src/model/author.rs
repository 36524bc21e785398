//! Author entity.

use super::entity::{Entity, EntitySpec, Validate};
use super::validation::{require_text, ValidationError};
use super::EntityId;
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: EntityId,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorDraft {
    pub name: String,
    pub country: String,
}

impl AuthorDraft {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
        }
    }
}

impl Validate for AuthorDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("country", &self.country)?;
        Ok(())
    }
}

impl Entity for Author {
    type Draft = AuthorDraft;

    const SPEC: EntitySpec = EntitySpec {
        kind: "author",
        label: "Author",
        table: "authors",
        columns: &["name", "country"],
        display_column: "name",
        select_sql: "SELECT id, name, country FROM authors",
        id_column: "id",
        headers: &["ID", "Name", "Country"],
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
            country: row.get("country")?,
        })
    }

    fn draft_values(draft: &Self::Draft) -> Vec<Value> {
        vec![
            Value::Text(draft.name.trim().to_string()),
            Value::Text(draft.country.trim().to_string()),
        ]
    }
}
