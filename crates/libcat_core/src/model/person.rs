//! Library users and students. Both kinds share the name + email shape.

use super::entity::{Entity, EntitySpec, Validate};
use super::validation::{require_text, ValidationError};
use super::EntityId;
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: EntityId,
    pub name: String,
    pub email: String,
}

/// Attributes of a user or student. Email uniqueness is not enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDraft {
    pub name: String,
    pub email: String,
}

impl PersonDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Validate for PersonDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("email", &self.email)?;
        Ok(())
    }
}

fn person_values(draft: &PersonDraft) -> Vec<Value> {
    vec![
        Value::Text(draft.name.trim().to_string()),
        Value::Text(draft.email.trim().to_string()),
    ]
}

impl Entity for User {
    type Draft = PersonDraft;

    const SPEC: EntitySpec = EntitySpec {
        kind: "user",
        label: "User",
        table: "users",
        columns: &["name", "email"],
        display_column: "name",
        select_sql: "SELECT id, name, email FROM users",
        id_column: "id",
        headers: &["ID", "Name", "Email"],
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
            email: row.get("email")?,
        })
    }

    fn draft_values(draft: &Self::Draft) -> Vec<Value> {
        person_values(draft)
    }
}

impl Entity for Student {
    type Draft = PersonDraft;

    const SPEC: EntitySpec = EntitySpec {
        kind: "student",
        label: "Student",
        table: "students",
        columns: &["name", "email"],
        display_column: "name",
        select_sql: "SELECT id, name, email FROM students",
        id_column: "id",
        headers: &["ID", "Name", "Email"],
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
            email: row.get("email")?,
        })
    }

    fn draft_values(draft: &Self::Draft) -> Vec<Value> {
        person_values(draft)
    }
}
