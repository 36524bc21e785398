//! Catalog domain model.
//!
//! # Responsibility
//! - Define entities, assignment read models and their drafts.
//! - Describe each kind's table layout as static configuration, so one
//!   generic repository pair serves every kind.
//!
//! # Invariants
//! - Identifiers are generated by the store and never change.
//! - Drafts are validated before any write reaches the store.

pub mod assignment;
pub mod author;
pub mod book;
pub mod entity;
pub mod person;
pub mod validation;

/// Store-generated integer identifier shared by every table.
pub type EntityId = i64;

pub use assignment::{
    AssignmentId, AssignmentRow, AuthorBook, DeletePolicy, Relationship, RelationshipSpec,
    StudentBook,
};
pub use author::{Author, AuthorDraft};
pub use book::{Book, BookDraft, BookInput};
pub use entity::{Entity, EntitySpec, Validate};
pub use person::{PersonDraft, Student, User};
pub use validation::ValidationError;
