//! Window controller: one repository coupled to one view cache.
//!
//! # Responsibility
//! - Drive the `Unloaded -> Loaded -> Closed` lifecycle of one window.
//! - Apply each successful repository mutation to the cache in lockstep.
//!
//! # Invariants
//! - A failed store write leaves the cache untouched.
//! - Every call on a window that is not `Loaded` (besides `open` from
//!   `Unloaded` and `close`) is rejected before any store access.
//! - `Closed` is terminal and discards the cache.

use super::cache::{CacheError, CachedRow, ViewCache};
use crate::model::{
    AssignmentId, AssignmentRow, Author, Book, BookDraft, BookInput, Entity, EntityId,
    Relationship,
};
use crate::repo::{
    resolve_book_input, EntityRepository, ErrorKind, RelationshipRepository, RepoError,
    RepoResult, SqliteEntityRepository, SqliteRelationshipRepository,
};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type WindowResult<T> = Result<T, WindowError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Unloaded,
    Loaded,
    Closed,
}

impl WindowState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::Closed => "closed",
        }
    }
}

/// Error for window operations.
#[derive(Debug)]
pub enum WindowError {
    /// The store operation failed; the cache was not touched.
    Repo(RepoError),
    /// The store write succeeded but the cache could not mirror it.
    Cache(CacheError),
    /// Call arrived while the window was in the wrong lifecycle state.
    InvalidState {
        window: &'static str,
        state: WindowState,
        action: &'static str,
    },
}

impl WindowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Repo(err) => err.kind(),
            Self::Cache(_) => ErrorKind::InternalConsistency,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
        }
    }
}

impl Display for WindowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Cache(err) => write!(f, "view out of sync with store: {err}"),
            Self::InvalidState {
                window,
                state,
                action,
            } => write!(
                f,
                "cannot {action} {window} window while it is {}",
                state.as_str()
            ),
        }
    }
}

impl Error for WindowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Cache(err) => Some(err),
            Self::InvalidState { .. } => None,
        }
    }
}

impl From<RepoError> for WindowError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<CacheError> for WindowError {
    fn from(value: CacheError) -> Self {
        Self::Cache(value)
    }
}

/// Repository side of a window: what it lists and how it is labelled.
pub trait WindowSource {
    type Row: CachedRow;

    fn kind(&self) -> &'static str;

    fn headers(&self) -> Vec<&'static str>;

    fn load_rows(&self) -> RepoResult<Vec<Self::Row>>;
}

impl<E: Entity + CachedRow> WindowSource for SqliteEntityRepository<'_, E> {
    type Row = E;

    fn kind(&self) -> &'static str {
        E::SPEC.kind
    }

    fn headers(&self) -> Vec<&'static str> {
        E::SPEC.headers.to_vec()
    }

    fn load_rows(&self) -> RepoResult<Vec<E>> {
        self.list_all()
    }
}

impl<R: Relationship> WindowSource for SqliteRelationshipRepository<'_, R> {
    type Row = AssignmentRow;

    fn kind(&self) -> &'static str {
        R::SPEC.kind
    }

    fn headers(&self) -> Vec<&'static str> {
        vec![
            "ID",
            <R::Left as Entity>::SPEC.label,
            <R::Right as Entity>::SPEC.label,
        ]
    }

    fn load_rows(&self) -> RepoResult<Vec<AssignmentRow>> {
        self.list_all()
    }
}

/// How a successful write must be mirrored into the cache.
enum CacheUpdate<T> {
    Append(T),
    Replace(T),
    Remove(EntityId),
}

pub struct Window<S: WindowSource> {
    source: S,
    cache: ViewCache<S::Row>,
    state: WindowState,
}

/// Window over one entity table.
pub type EntityWindow<'g, E> = Window<SqliteEntityRepository<'g, E>>;

/// Window over one assignment table.
pub type AssignmentWindow<'g, R> = Window<SqliteRelationshipRepository<'g, R>>;

impl<S: WindowSource> Window<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: ViewCache::new(),
            state: WindowState::Unloaded,
        }
    }

    /// Loads every row into the cache. Allowed only once, from `Unloaded`.
    pub fn open(&mut self) -> WindowResult<()> {
        if self.state != WindowState::Unloaded {
            return Err(self.invalid_state("open"));
        }
        self.load()?;
        self.state = WindowState::Loaded;
        Ok(())
    }

    /// Rebuilds the cache from the store.
    pub fn refresh(&mut self) -> WindowResult<()> {
        self.ensure_loaded("refresh")?;
        self.load()
    }

    /// Discards the cache. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state == WindowState::Closed {
            return;
        }
        self.cache.clear();
        self.state = WindowState::Closed;
        info!(
            "event=window_close module=view status=ok window={}",
            self.source.kind()
        );
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn rows(&self) -> &[S::Row] {
        self.cache.rows()
    }

    pub fn row(&self, id: EntityId) -> Option<&S::Row> {
        self.cache.get(id)
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.source.headers()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn load(&mut self) -> WindowResult<()> {
        let rows = self.source.load_rows()?;
        self.cache.reload(rows)?;
        info!(
            "event=window_load module=view status=ok window={} rows={}",
            self.source.kind(),
            self.cache.len()
        );
        Ok(())
    }

    fn ensure_loaded(&self, action: &'static str) -> WindowResult<()> {
        if self.state == WindowState::Loaded {
            Ok(())
        } else {
            Err(self.invalid_state(action))
        }
    }

    fn invalid_state(&self, action: &'static str) -> WindowError {
        WindowError::InvalidState {
            window: self.source.kind(),
            state: self.state,
            action,
        }
    }

    /// Runs one store write and mirrors its outcome into the cache.
    fn apply<T>(
        &mut self,
        action: &'static str,
        write: impl FnOnce(&S) -> RepoResult<(T, CacheUpdate<S::Row>)>,
    ) -> WindowResult<T> {
        self.ensure_loaded(action)?;
        let (value, update) = write(&self.source)?;
        let mirrored = match update {
            CacheUpdate::Append(row) => self.cache.append_row(row),
            CacheUpdate::Replace(row) => self.cache.replace_row(row).map(|_| ()),
            CacheUpdate::Remove(id) => self.cache.remove_row(id).map(|_| ()),
        };
        if let Err(err) = mirrored {
            error!(
                "event=window_sync module=view status=error window={} action={action} error={err}",
                self.source.kind()
            );
            return Err(err.into());
        }
        Ok(value)
    }
}

impl<'g, E: Entity + CachedRow> Window<SqliteEntityRepository<'g, E>> {
    /// Creates one row and appends it with its generated id.
    pub fn add(&mut self, draft: &E::Draft) -> WindowResult<E> {
        self.apply("add", |repo| {
            let created = repo.create(draft)?;
            Ok((created.clone(), CacheUpdate::Append(created)))
        })
    }

    /// Rewrites one row and replaces it in place.
    pub fn edit(&mut self, id: EntityId, draft: &E::Draft) -> WindowResult<E> {
        self.apply("edit", |repo| {
            let updated = repo.update(id, draft)?;
            Ok((updated.clone(), CacheUpdate::Replace(updated)))
        })
    }

    pub fn remove(&mut self, id: EntityId) -> WindowResult<()> {
        self.apply("remove", |repo| {
            repo.delete(id)?;
            Ok(((), CacheUpdate::Remove(id)))
        })
    }
}

impl<'g> Window<SqliteEntityRepository<'g, Book>> {
    /// Adds a book from raw form text, resolving the author name at write time.
    pub fn add_from_input(&mut self, input: &BookInput<'_>) -> WindowResult<Book> {
        self.ensure_loaded("add")?;
        let draft = self.book_draft(input)?;
        self.add(&draft)
    }

    pub fn edit_from_input(&mut self, id: EntityId, input: &BookInput<'_>) -> WindowResult<Book> {
        self.ensure_loaded("edit")?;
        let draft = self.book_draft(input)?;
        self.edit(id, &draft)
    }

    /// Current author names for the book form's choice list.
    pub fn author_choices(&self) -> WindowResult<Vec<String>> {
        self.ensure_loaded("list authors for")?;
        let lookup = self.authors().name_lookup()?;
        Ok(lookup.names().to_vec())
    }

    fn authors(&self) -> SqliteEntityRepository<'g, Author> {
        SqliteEntityRepository::new(self.source.gateway())
    }

    fn book_draft(&self, input: &BookInput<'_>) -> WindowResult<BookDraft> {
        let lookup = self.authors().name_lookup()?;
        resolve_book_input(input, &lookup).map_err(|err| WindowError::Repo(err.into()))
    }
}

impl<'g, R: Relationship> Window<SqliteRelationshipRepository<'g, R>> {
    /// Pairs two entities by display name and appends the new assignment.
    pub fn assign(&mut self, left_name: &str, right_name: &str) -> WindowResult<AssignmentRow> {
        self.apply("assign", |repo| {
            let created = repo.create(left_name, right_name)?;
            Ok((created.clone(), CacheUpdate::Append(created)))
        })
    }

    pub fn reassign(
        &mut self,
        id: AssignmentId,
        left_name: &str,
        right_name: &str,
    ) -> WindowResult<AssignmentRow> {
        self.apply("reassign", |repo| {
            let updated = repo.update(id, left_name, right_name)?;
            Ok((updated.clone(), CacheUpdate::Replace(updated)))
        })
    }

    pub fn unassign(&mut self, id: AssignmentId) -> WindowResult<()> {
        self.apply("unassign", |repo| {
            repo.delete(id)?;
            Ok(((), CacheUpdate::Remove(id)))
        })
    }

    pub fn left_choices(&self) -> WindowResult<Vec<String>> {
        self.ensure_loaded("list choices for")?;
        Ok(self.source.left_lookup()?.names().to_vec())
    }

    pub fn right_choices(&self) -> WindowResult<Vec<String>> {
        self.ensure_loaded("list choices for")?;
        Ok(self.source.right_lookup()?.names().to_vec())
    }
}
