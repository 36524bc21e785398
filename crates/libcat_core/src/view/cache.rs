//! In-memory mirror of the rows one window displays.
//!
//! # Invariants
//! - No two rows share an identifier.
//! - A mutation that cannot find (or would duplicate) its identifier leaves
//!   the rows untouched and reports `CacheError`.
//! - Row order is load order followed by append order.

use crate::model::{AssignmentRow, Author, Book, EntityId, Student, User};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One presentation row addressed by a store identifier.
pub trait CachedRow: Clone {
    fn row_id(&self) -> EntityId;

    /// Display cells, identifier first.
    fn cells(&self) -> Vec<String>;
}

/// View cache lost lockstep with the rows it expected to mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    DuplicateRow(EntityId),
    MissingRow(EntityId),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRow(id) => write!(f, "view already holds a row with id {id}"),
            Self::MissingRow(id) => write!(f, "view holds no row with id {id}"),
        }
    }
}

impl Error for CacheError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCache<T> {
    rows: Vec<T>,
}

impl<T> Default for ViewCache<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: CachedRow> ViewCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every row. Rejects input with repeated identifiers.
    pub fn reload(&mut self, rows: Vec<T>) -> Result<(), CacheError> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            let id = row.row_id();
            if !seen.insert(id) {
                return Err(CacheError::DuplicateRow(id));
            }
        }
        self.rows = rows;
        Ok(())
    }

    pub fn append_row(&mut self, row: T) -> Result<(), CacheError> {
        let id = row.row_id();
        if self.position(id).is_some() {
            return Err(CacheError::DuplicateRow(id));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Replaces the row carrying `row`'s identifier, wherever it sits.
    ///
    /// Returns the position of the replaced row.
    pub fn replace_row(&mut self, row: T) -> Result<usize, CacheError> {
        let id = row.row_id();
        let index = self.position(id).ok_or(CacheError::MissingRow(id))?;
        self.rows[index] = row;
        Ok(index)
    }

    pub fn remove_row(&mut self, id: EntityId) -> Result<T, CacheError> {
        let index = self.position(id).ok_or(CacheError::MissingRow(id))?;
        Ok(self.rows.remove(index))
    }

    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.rows.iter().position(|row| row.row_id() == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.rows.iter().find(|row| row.row_id() == id)
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

impl CachedRow for Author {
    fn row_id(&self) -> EntityId {
        self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.country.clone()]
    }
}

impl CachedRow for Book {
    fn row_id(&self) -> EntityId {
        self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.count.to_string(),
            self.papers.to_string(),
            reference_cell(self.author_id, self.author_name.as_deref()),
        ]
    }
}

impl CachedRow for User {
    fn row_id(&self) -> EntityId {
        self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.email.clone()]
    }
}

impl CachedRow for Student {
    fn row_id(&self) -> EntityId {
        self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.email.clone()]
    }
}

impl CachedRow for AssignmentRow {
    fn row_id(&self) -> EntityId {
        self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            reference_cell(self.left_id, self.left_name.as_deref()),
            reference_cell(self.right_id, self.right_name.as_deref()),
        ]
    }
}

/// Renders a joined reference; dangling ids stay visible as `#id (missing)`.
fn reference_cell(id: Option<EntityId>, name: Option<&str>) -> String {
    match (id, name) {
        (_, Some(name)) => name.to_string(),
        (Some(id), None) => format!("#{id} (missing)"),
        (None, None) => String::new(),
    }
}
