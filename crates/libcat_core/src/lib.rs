//! Data-access core for a small library catalog.
//! Entities, assignments and the window caches that mirror them all go
//! through one SQLite gateway.

pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod view;

pub use catalog::{Catalog, CatalogSummary};
pub use config::{CatalogConfig, ConfigError, DeletePolicies};
pub use db::{DbError, DbResult, Gateway};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{
    AssignmentId, AssignmentRow, Author, AuthorBook, AuthorDraft, Book, BookDraft, BookInput,
    DeletePolicy, EntityId, PersonDraft, Student, StudentBook, User, ValidationError,
};
pub use repo::{
    EntityRepository, ErrorKind, NameLookup, RelationshipRepository, RepoError, RepoResult,
};
pub use view::{
    AssignmentWindow, CacheError, EntityWindow, ViewCache, WindowError, WindowResult, WindowState,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
