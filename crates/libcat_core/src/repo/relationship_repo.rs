//! Generic assignment repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over one join table, driven by `RelationshipSpec`.
//! - Resolve display names to identifiers at the moment of mutation.
//! - Own delete-policy handling for entities referenced by join rows.
//!
//! # Invariants
//! - Name resolution and the write share one transaction; nothing is
//!   written when either side fails to resolve.
//! - Reads left-join both entity tables, so dangling references are still
//!   listed with their display name absent.
//! - Duplicate (left, right) pairs are allowed.

use super::entity_repo::{load_lookup, row_exists};
use super::error::{RepoError, RepoResult};
use super::lookup::NameLookup;
use crate::db::Gateway;
use crate::model::validation::{require_text, ValidationError};
use crate::model::{
    AssignmentId, AssignmentRow, DeletePolicy, Entity, EntityId, Relationship, RelationshipSpec,
};
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::marker::PhantomData;
use std::time::Instant;

/// Repository interface for one relationship kind.
pub trait RelationshipRepository<R: Relationship> {
    /// Every assignment with both display names, ordered by id.
    fn list_all(&self) -> RepoResult<Vec<AssignmentRow>>;
    fn get(&self, id: AssignmentId) -> RepoResult<Option<AssignmentRow>>;
    /// Resolves both names, inserts one join row and returns it.
    fn create(&self, left_name: &str, right_name: &str) -> RepoResult<AssignmentRow>;
    /// Same as `create` for callers that already hold identifiers.
    fn create_by_ids(&self, left_id: EntityId, right_id: EntityId) -> RepoResult<AssignmentRow>;
    /// Resolves both names and rewrites both references of one row.
    fn update(
        &self,
        id: AssignmentId,
        left_name: &str,
        right_name: &str,
    ) -> RepoResult<AssignmentRow>;
    fn delete(&self, id: AssignmentId) -> RepoResult<()>;
    /// Choice list for the left side.
    fn left_lookup(&self) -> RepoResult<NameLookup>;
    /// Choice list for the right side.
    fn right_lookup(&self) -> RepoResult<NameLookup>;
}

/// SQLite-backed repository for any `Relationship` kind.
pub struct SqliteRelationshipRepository<'g, R> {
    gateway: &'g Gateway,
    _kind: PhantomData<R>,
}

impl<'g, R: Relationship> SqliteRelationshipRepository<'g, R> {
    pub fn new(gateway: &'g Gateway) -> Self {
        Self {
            gateway,
            _kind: PhantomData,
        }
    }

    pub fn gateway(&self) -> &'g Gateway {
        self.gateway
    }

    fn log_write<T>(&self, event: &str, started_at: Instant, result: &RepoResult<T>) {
        match result {
            Ok(_) => info!(
                "event={event} module=repo status=ok kind={} duration_ms={}",
                R::SPEC.kind,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event={event} module=repo status=error kind={} duration_ms={} error_kind={}",
                R::SPEC.kind,
                started_at.elapsed().as_millis(),
                err.kind().as_str()
            ),
        }
    }
}

impl<R: Relationship> RelationshipRepository<R> for SqliteRelationshipRepository<'_, R> {
    fn list_all(&self) -> RepoResult<Vec<AssignmentRow>> {
        let sql = format!("{} ORDER BY r.id ASC;", select_sql::<R>());
        let rows = self.gateway.query(&sql, [], parse_assignment_row)?;
        Ok(rows)
    }

    fn get(&self, id: AssignmentId) -> RepoResult<Option<AssignmentRow>> {
        self.gateway.with_connection(|conn| load_assignment::<R>(conn, id))
    }

    fn create(&self, left_name: &str, right_name: &str) -> RepoResult<AssignmentRow> {
        let started_at = Instant::now();
        require_text(<R::Left as Entity>::SPEC.kind, left_name)?;
        require_text(<R::Right as Entity>::SPEC.kind, right_name)?;

        let result = self.gateway.with_transaction(|tx| {
            let (left_id, right_id) = resolve_pair::<R>(tx, left_name, right_name)?;
            insert_assignment::<R>(tx, left_id, right_id)
        });
        self.log_write("assignment_create", started_at, &result);
        result
    }

    fn create_by_ids(&self, left_id: EntityId, right_id: EntityId) -> RepoResult<AssignmentRow> {
        let started_at = Instant::now();
        let result = self.gateway.with_transaction(|tx| {
            require_existing::<R::Left>(tx, left_id)?;
            require_existing::<R::Right>(tx, right_id)?;
            insert_assignment::<R>(tx, left_id, right_id)
        });
        self.log_write("assignment_create", started_at, &result);
        result
    }

    fn update(
        &self,
        id: AssignmentId,
        left_name: &str,
        right_name: &str,
    ) -> RepoResult<AssignmentRow> {
        let started_at = Instant::now();
        require_text(<R::Left as Entity>::SPEC.kind, left_name)?;
        require_text(<R::Right as Entity>::SPEC.kind, right_name)?;

        let result = self.gateway.with_transaction(|tx| {
            let (left_id, right_id) = resolve_pair::<R>(tx, left_name, right_name)?;
            let spec = R::SPEC;
            let changed = tx.execute(
                &format!(
                    "UPDATE {} SET {} = ?1, {} = ?2 WHERE id = ?3;",
                    spec.table, spec.left_column, spec.right_column
                ),
                params![left_id, right_id, id],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    kind: spec.kind,
                    id,
                });
            }
            load_required::<R>(tx, id)
        });
        self.log_write("assignment_update", started_at, &result);
        result
    }

    fn delete(&self, id: AssignmentId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.gateway.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", R::SPEC.table),
            [id],
        );
        let result = match result {
            Ok(0) => Err(RepoError::NotFound {
                kind: R::SPEC.kind,
                id,
            }),
            Ok(_) => Ok(()),
            Err(err) => Err(err.into()),
        };
        self.log_write("assignment_delete", started_at, &result);
        result
    }

    fn left_lookup(&self) -> RepoResult<NameLookup> {
        self.gateway.with_connection(load_lookup::<R::Left>)
    }

    fn right_lookup(&self) -> RepoResult<NameLookup> {
        self.gateway.with_connection(load_lookup::<R::Right>)
    }
}

/// One join table column that references an entity kind, with the policy
/// applied when a referenced entity is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferencingLink {
    pub relationship: RelationshipSpec,
    pub column: &'static str,
    pub policy: DeletePolicy,
}

impl ReferencingLink {
    /// Link for the entity kind on the left side of `R`.
    pub fn left_of<R: Relationship>(policy: DeletePolicy) -> Self {
        Self {
            relationship: R::SPEC,
            column: R::SPEC.left_column,
            policy,
        }
    }

    /// Link for the entity kind on the right side of `R`.
    pub fn right_of<R: Relationship>(policy: DeletePolicy) -> Self {
        Self {
            relationship: R::SPEC,
            column: R::SPEC.right_column,
            policy,
        }
    }
}

/// Applies `link.policy` for one entity about to be deleted.
///
/// Must run inside the transaction that deletes the entity row.
pub(crate) fn apply_delete_policy(
    conn: &Connection,
    link: &ReferencingLink,
    entity_kind: &'static str,
    entity_id: EntityId,
) -> RepoResult<()> {
    let table = link.relationship.table;
    let column = link.column;
    let affected = match link.policy {
        DeletePolicy::NoAction => return Ok(()),
        DeletePolicy::Restrict => {
            let references: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1;"),
                [entity_id],
                |row| row.get(0),
            )?;
            if references > 0 {
                return Err(RepoError::Restricted {
                    kind: entity_kind,
                    id: entity_id,
                    table,
                    references: usize::try_from(references).unwrap_or(usize::MAX),
                });
            }
            0
        }
        DeletePolicy::Cascade => conn.execute(
            &format!("DELETE FROM {table} WHERE {column} = ?1;"),
            [entity_id],
        )?,
        DeletePolicy::SetNull => conn.execute(
            &format!("UPDATE {table} SET {column} = NULL WHERE {column} = ?1;"),
            [entity_id],
        )?,
    };
    debug!(
        "event=delete_policy module=repo status=ok kind={entity_kind} id={entity_id} \
         table={table} policy={} affected={affected}",
        link.policy.as_str()
    );
    Ok(())
}

fn select_sql<R: Relationship>() -> String {
    let spec = R::SPEC;
    let left = <R::Left as Entity>::SPEC;
    let right = <R::Right as Entity>::SPEC;
    format!(
        "SELECT
            r.id AS id,
            r.{left_column} AS left_id,
            l.{left_display} AS left_name,
            r.{right_column} AS right_id,
            rt.{right_display} AS right_name
         FROM {table} r
         LEFT JOIN {left_table} l ON l.id = r.{left_column}
         LEFT JOIN {right_table} rt ON rt.id = r.{right_column}",
        left_column = spec.left_column,
        right_column = spec.right_column,
        left_display = left.display_column,
        right_display = right.display_column,
        table = spec.table,
        left_table = left.table,
        right_table = right.table,
    )
}

fn parse_assignment_row(row: &Row<'_>) -> rusqlite::Result<AssignmentRow> {
    Ok(AssignmentRow {
        id: row.get("id")?,
        left_id: row.get("left_id")?,
        left_name: row.get("left_name")?,
        right_id: row.get("right_id")?,
        right_name: row.get("right_name")?,
    })
}

fn load_assignment<R: Relationship>(
    conn: &Connection,
    id: AssignmentId,
) -> RepoResult<Option<AssignmentRow>> {
    let sql = format!("{} WHERE r.id = ?1;", select_sql::<R>());
    let row = conn.query_row(&sql, [id], parse_assignment_row).optional()?;
    Ok(row)
}

fn load_required<R: Relationship>(
    conn: &Connection,
    id: AssignmentId,
) -> RepoResult<AssignmentRow> {
    load_assignment::<R>(conn, id)?.ok_or(RepoError::NotFound {
        kind: R::SPEC.kind,
        id,
    })
}

fn resolve_pair<R: Relationship>(
    conn: &Connection,
    left_name: &str,
    right_name: &str,
) -> RepoResult<(EntityId, EntityId)> {
    let left_id = load_lookup::<R::Left>(conn)?.resolve(left_name)?;
    let right_id = load_lookup::<R::Right>(conn)?.resolve(right_name)?;
    Ok((left_id, right_id))
}

fn require_existing<E: Entity>(conn: &Connection, id: EntityId) -> RepoResult<()> {
    if !row_exists(conn, E::SPEC.table, id)? {
        return Err(ValidationError::UnknownReference {
            kind: E::SPEC.kind,
            id,
        }
        .into());
    }
    Ok(())
}

fn insert_assignment<R: Relationship>(
    conn: &Connection,
    left_id: EntityId,
    right_id: EntityId,
) -> RepoResult<AssignmentRow> {
    let spec = R::SPEC;
    conn.execute(
        &format!(
            "INSERT INTO {} ({}, {}) VALUES (?1, ?2);",
            spec.table, spec.left_column, spec.right_column
        ),
        params![left_id, right_id],
    )?;
    load_required::<R>(conn, conn.last_insert_rowid())
}
