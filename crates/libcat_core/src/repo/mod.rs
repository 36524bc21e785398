//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define CRUD contracts for entity and relationship kinds.
//! - Isolate SQL details from window/catalog orchestration.
//!
//! # Invariants
//! - Repository writes validate drafts before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Restricted`) in
//!   addition to classified store errors.

pub mod entity_repo;
pub mod error;
pub mod lookup;
pub mod relationship_repo;

pub use entity_repo::{EntityRepository, SqliteEntityRepository};
pub use error::{ErrorKind, RepoError, RepoResult};
pub use lookup::{resolve_book_input, NameLookup};
pub use relationship_repo::{
    ReferencingLink, RelationshipRepository, SqliteRelationshipRepository,
};
