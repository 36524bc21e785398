//! Many-to-many assignments between two entity kinds.
//!
//! # Invariants
//! - Every assignment row has its own generated id; duplicate pairs are
//!   allowed and edited independently.
//! - Display names are never stored on assignment rows.

use super::author::Author;
use super::book::Book;
use super::entity::Entity;
use super::person::Student;
use super::EntityId;
use serde::{Deserialize, Serialize};

pub type AssignmentId = i64;

/// Static join-table layout for one relationship kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipSpec {
    pub kind: &'static str,
    pub table: &'static str,
    /// Column referencing `Left::SPEC.table`.
    pub left_column: &'static str,
    /// Column referencing `Right::SPEC.table`.
    pub right_column: &'static str,
}

/// Relationship kind linking two entity kinds through a join table.
pub trait Relationship {
    type Left: Entity;
    type Right: Entity;

    const SPEC: RelationshipSpec;
}

/// Author wrote book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorBook;

impl Relationship for AuthorBook {
    type Left = Author;
    type Right = Book;

    const SPEC: RelationshipSpec = RelationshipSpec {
        kind: "author_book",
        table: "author_books",
        left_column: "author_id",
        right_column: "book_id",
    };
}

/// Student borrowed book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentBook;

impl Relationship for StudentBook {
    type Left = Student;
    type Right = Book;

    const SPEC: RelationshipSpec = RelationshipSpec {
        kind: "student_book",
        table: "student_books",
        left_column: "student_id",
        right_column: "book_id",
    };
}

/// What happens to assignment rows when a referenced entity is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Leave assignment rows untouched; they keep a dangling reference.
    #[default]
    NoAction,
    /// Refuse to delete an entity that is still referenced.
    Restrict,
    /// Delete referencing assignment rows together with the entity.
    Cascade,
    /// Clear the reference column on referencing assignment rows.
    SetNull,
}

impl DeletePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoAction => "no_action",
            Self::Restrict => "restrict",
            Self::Cascade => "cascade",
            Self::SetNull => "set_null",
        }
    }
}

/// Denormalized assignment read model.
///
/// Names are `None` when the reference is cleared or points at a row that
/// no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub id: AssignmentId,
    pub left_id: Option<EntityId>,
    pub left_name: Option<String>,
    pub right_id: Option<EntityId>,
    pub right_name: Option<String>,
}

impl AssignmentRow {
    /// True when either side references a missing or cleared entity.
    pub fn is_dangling(&self) -> bool {
        self.left_name.is_none() || self.right_name.is_none()
    }
}
