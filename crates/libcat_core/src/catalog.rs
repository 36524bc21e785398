//! Catalog facade: one gateway plus the repositories and windows built on it.
//!
//! # Responsibility
//! - Open the store described by `CatalogConfig`.
//! - Wire configured delete policies into every entity repository whose
//!   kind is referenced by an assignment table.
//!
//! # Invariants
//! - Repositories and windows borrow the catalog's gateway; none outlives it.

use crate::config::{CatalogConfig, DeletePolicies};
use crate::db::{DbResult, Gateway};
use crate::model::{Author, AuthorBook, Book, BookDraft, BookInput, Student, StudentBook, User};
use crate::repo::{
    resolve_book_input, EntityRepository, ReferencingLink, RelationshipRepository, RepoResult,
    SqliteEntityRepository, SqliteRelationshipRepository,
};
use crate::view::{AssignmentWindow, EntityWindow, Window};

pub struct Catalog {
    gateway: Gateway,
    policies: DeletePolicies,
}

/// Row count per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub authors: usize,
    pub books: usize,
    pub users: usize,
    pub students: usize,
    pub author_books: usize,
    pub student_books: usize,
}

impl Catalog {
    /// Opens the file at `config.db_path`, or a private in-memory store.
    pub fn open(config: &CatalogConfig) -> DbResult<Self> {
        let gateway = match &config.db_path {
            Some(path) => Gateway::open_file(path)?,
            None => Gateway::open_in_memory()?,
        };
        Ok(Self::with_gateway(gateway, config.delete_policies))
    }

    /// In-memory catalog with default policies.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::with_gateway(
            Gateway::open_in_memory()?,
            DeletePolicies::default(),
        ))
    }

    pub fn with_gateway(gateway: Gateway, policies: DeletePolicies) -> Self {
        Self { gateway, policies }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn policies(&self) -> DeletePolicies {
        self.policies
    }

    pub fn authors(&self) -> SqliteEntityRepository<'_, Author> {
        SqliteEntityRepository::new(&self.gateway)
            .with_link(ReferencingLink::left_of::<AuthorBook>(self.policies.author_books))
    }

    pub fn books(&self) -> SqliteEntityRepository<'_, Book> {
        SqliteEntityRepository::new(&self.gateway)
            .with_link(ReferencingLink::right_of::<AuthorBook>(self.policies.author_books))
            .with_link(ReferencingLink::right_of::<StudentBook>(
                self.policies.student_books,
            ))
    }

    pub fn users(&self) -> SqliteEntityRepository<'_, User> {
        SqliteEntityRepository::new(&self.gateway)
    }

    pub fn students(&self) -> SqliteEntityRepository<'_, Student> {
        SqliteEntityRepository::new(&self.gateway)
            .with_link(ReferencingLink::left_of::<StudentBook>(self.policies.student_books))
    }

    pub fn author_books(&self) -> SqliteRelationshipRepository<'_, AuthorBook> {
        SqliteRelationshipRepository::new(&self.gateway)
    }

    pub fn student_books(&self) -> SqliteRelationshipRepository<'_, StudentBook> {
        SqliteRelationshipRepository::new(&self.gateway)
    }

    pub fn authors_window(&self) -> EntityWindow<'_, Author> {
        Window::new(self.authors())
    }

    pub fn books_window(&self) -> EntityWindow<'_, Book> {
        Window::new(self.books())
    }

    pub fn users_window(&self) -> EntityWindow<'_, User> {
        Window::new(self.users())
    }

    pub fn students_window(&self) -> EntityWindow<'_, Student> {
        Window::new(self.students())
    }

    pub fn author_books_window(&self) -> AssignmentWindow<'_, AuthorBook> {
        Window::new(self.author_books())
    }

    pub fn student_books_window(&self) -> AssignmentWindow<'_, StudentBook> {
        Window::new(self.student_books())
    }

    /// Resolves a raw book form against the current author names.
    pub fn book_draft(&self, input: &BookInput<'_>) -> RepoResult<BookDraft> {
        let authors = self.authors().name_lookup()?;
        Ok(resolve_book_input(input, &authors)?)
    }

    pub fn summary(&self) -> RepoResult<CatalogSummary> {
        Ok(CatalogSummary {
            authors: self.authors().list_all()?.len(),
            books: self.books().list_all()?.len(),
            users: self.users().list_all()?.len(),
            students: self.students().list_all()?.len(),
            author_books: self.author_books().list_all()?.len(),
            student_books: self.student_books().list_all()?.len(),
        })
    }
}
