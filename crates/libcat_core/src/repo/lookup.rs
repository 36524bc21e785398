//! Display-name to identifier lookup.
//!
//! Repositories rebuild a lookup from the store at the moment it is needed,
//! so a lookup is never older than the operation using it.

use crate::model::validation::ValidationError;
use crate::model::{BookDraft, BookInput, EntityId};
use std::collections::HashMap;

/// Name → id map for one entity kind, plus the names in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameLookup {
    kind: &'static str,
    ids_by_name: HashMap<String, Vec<EntityId>>,
    names: Vec<String>,
}

impl NameLookup {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            ids_by_name: HashMap::new(),
            names: Vec::new(),
        }
    }

    pub fn from_pairs(
        kind: &'static str,
        pairs: impl IntoIterator<Item = (EntityId, String)>,
    ) -> Self {
        let mut lookup = Self::new(kind);
        lookup.refresh(pairs);
        lookup
    }

    /// Replaces the whole content with `pairs`.
    pub fn refresh(&mut self, pairs: impl IntoIterator<Item = (EntityId, String)>) {
        self.ids_by_name.clear();
        self.names.clear();
        for (id, name) in pairs {
            let ids = self.ids_by_name.entry(name.clone()).or_default();
            if ids.is_empty() {
                self.names.push(name);
            }
            ids.push(id);
        }
    }

    /// Resolves one display name to exactly one identifier.
    ///
    /// # Errors
    /// - `MissingField(kind)` when `name` is blank.
    /// - `UnresolvedReference` when no row carries the name.
    /// - `AmbiguousReference` when several rows carry the name.
    pub fn resolve(&self, name: &str) -> Result<EntityId, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField(self.kind));
        }
        match self.ids_by_name.get(trimmed).map(Vec::as_slice) {
            Some([id]) => Ok(*id),
            Some(ids) if ids.len() > 1 => Err(ValidationError::AmbiguousReference {
                kind: self.kind,
                name: trimmed.to_string(),
                matches: ids.len(),
            }),
            _ => Err(ValidationError::UnresolvedReference {
                kind: self.kind,
                name: trimmed.to_string(),
            }),
        }
    }

    /// Distinct names in load order, for choice lists.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Turns a raw book form into a draft, resolving the author name against
/// `authors`.
pub fn resolve_book_input(
    input: &BookInput<'_>,
    authors: &NameLookup,
) -> Result<BookDraft, ValidationError> {
    let draft = BookDraft::from_input(input.name, input.count, input.papers)?;
    match input.author {
        None => Ok(draft),
        Some(name) => Ok(draft.with_author(authors.resolve(name)?)),
    }
}
