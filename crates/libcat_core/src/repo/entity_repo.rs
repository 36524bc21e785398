//! Generic entity repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over one single-table entity kind, driven by `EntitySpec`.
//! - Apply relationship delete policies before an entity row is removed.
//!
//! # Invariants
//! - Write paths call `Validate::validate()` before any SQL mutation.
//! - Create/update return the row as re-read from the store, so read-time
//!   joins and generated ids are always reflected.
//! - Update/delete of an unknown id reports `RepoError::NotFound`.

use super::error::{RepoError, RepoResult};
use super::lookup::NameLookup;
use super::relationship_repo::{apply_delete_policy, ReferencingLink};
use crate::db::Gateway;
use crate::model::{Entity, EntityId, Validate};
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::marker::PhantomData;
use std::time::Instant;

/// Repository interface for one entity kind.
pub trait EntityRepository<E: Entity> {
    /// Every row, ordered by identifier.
    fn list_all(&self) -> RepoResult<Vec<E>>;
    fn get(&self, id: EntityId) -> RepoResult<Option<E>>;
    /// Validates, inserts and returns the stored row with its generated id.
    fn create(&self, draft: &E::Draft) -> RepoResult<E>;
    /// Validates and rewrites every attribute of an existing row.
    fn update(&self, id: EntityId, draft: &E::Draft) -> RepoResult<E>;
    /// Removes one row after applying configured delete policies.
    fn delete(&self, id: EntityId) -> RepoResult<()>;
    /// Resolves a display name against current store content.
    fn resolve_name(&self, name: &str) -> RepoResult<EntityId>;
    /// Fresh name → id map of the current store content.
    fn name_lookup(&self) -> RepoResult<NameLookup>;
}

/// SQLite-backed repository for any `Entity` kind.
pub struct SqliteEntityRepository<'g, E> {
    gateway: &'g Gateway,
    links: Vec<ReferencingLink>,
    _kind: PhantomData<E>,
}

impl<'g, E: Entity> SqliteEntityRepository<'g, E> {
    /// Repository whose deletes touch no assignment rows.
    pub fn new(gateway: &'g Gateway) -> Self {
        Self {
            gateway,
            links: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Registers one assignment table that references this entity kind.
    pub fn with_link(mut self, link: ReferencingLink) -> Self {
        self.links.push(link);
        self
    }

    pub fn links(&self) -> &[ReferencingLink] {
        &self.links
    }

    pub fn gateway(&self) -> &'g Gateway {
        self.gateway
    }
}

impl<E: Entity> EntityRepository<E> for SqliteEntityRepository<'_, E> {
    fn list_all(&self) -> RepoResult<Vec<E>> {
        let sql = format!("{} ORDER BY {} ASC;", E::SPEC.select_sql, E::SPEC.id_column);
        let rows = self.gateway.query(&sql, [], E::from_row)?;
        Ok(rows)
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<E>> {
        self.gateway.with_connection(|conn| load_entity::<E>(conn, id))
    }

    fn create(&self, draft: &E::Draft) -> RepoResult<E> {
        let started_at = Instant::now();
        draft.validate()?;

        let result = self.gateway.with_transaction(|tx| {
            tx.execute(
                &insert_sql(E::SPEC.table, E::SPEC.columns),
                params_from_iter(E::draft_values(draft)),
            )?;
            let id = tx.last_insert_rowid();
            load_required::<E>(tx, id)
        });
        log_write::<E, _>("entity_create", started_at, &result, |entity| entity.id());
        result
    }

    fn update(&self, id: EntityId, draft: &E::Draft) -> RepoResult<E> {
        let started_at = Instant::now();
        draft.validate()?;

        let result = self.gateway.with_transaction(|tx| {
            let mut values = E::draft_values(draft);
            values.push(Value::Integer(id));
            let changed = tx.execute(
                &update_sql(E::SPEC.table, E::SPEC.columns),
                params_from_iter(values),
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    kind: E::SPEC.kind,
                    id,
                });
            }
            load_required::<E>(tx, id)
        });
        log_write::<E, _>("entity_update", started_at, &result, |_| id);
        result
    }

    fn delete(&self, id: EntityId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.gateway.with_transaction(|tx| {
            if !row_exists(tx, E::SPEC.table, id)? {
                return Err(RepoError::NotFound {
                    kind: E::SPEC.kind,
                    id,
                });
            }
            for link in &self.links {
                apply_delete_policy(tx, link, E::SPEC.kind, id)?;
            }
            tx.execute(
                &format!("DELETE FROM {} WHERE id = ?1;", E::SPEC.table),
                [id],
            )?;
            Ok(())
        });
        log_write::<E, _>("entity_delete", started_at, &result, |_| id);
        result
    }

    fn resolve_name(&self, name: &str) -> RepoResult<EntityId> {
        let lookup = self.name_lookup()?;
        Ok(lookup.resolve(name)?)
    }

    fn name_lookup(&self) -> RepoResult<NameLookup> {
        self.gateway.with_connection(load_lookup::<E>)
    }
}

/// Loads one entity through its read-time select.
pub(crate) fn load_entity<E: Entity>(conn: &Connection, id: EntityId) -> RepoResult<Option<E>> {
    let sql = format!("{} WHERE {} = ?1;", E::SPEC.select_sql, E::SPEC.id_column);
    let entity = conn.query_row(&sql, [id], E::from_row).optional()?;
    Ok(entity)
}

fn load_required<E: Entity>(conn: &Connection, id: EntityId) -> RepoResult<E> {
    load_entity::<E>(conn, id)?.ok_or(RepoError::NotFound {
        kind: E::SPEC.kind,
        id,
    })
}

/// Builds a lookup of the current display names of one entity kind.
pub(crate) fn load_lookup<E: Entity>(conn: &Connection) -> RepoResult<NameLookup> {
    let sql = format!(
        "SELECT id, {} FROM {} ORDER BY id ASC;",
        E::SPEC.display_column,
        E::SPEC.table
    );
    let mut stmt = conn.prepare(&sql)?;
    let pairs = stmt
        .query_map([], |row| Ok((row.get::<_, EntityId>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NameLookup::from_pairs(E::SPEC.kind, pairs))
}

pub(crate) fn row_exists(conn: &Connection, table: &str, id: EntityId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = (1..=columns.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders});",
        columns.join(", ")
    )
}

fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {table} SET {assignments} WHERE id = ?{};",
        columns.len() + 1
    )
}

fn log_write<E: Entity, T>(
    event: &str,
    started_at: Instant,
    result: &RepoResult<T>,
    id_of: impl Fn(&T) -> EntityId,
) {
    match result {
        Ok(value) => info!(
            "event={event} module=repo status=ok kind={} id={} duration_ms={}",
            E::SPEC.kind,
            id_of(value),
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={event} module=repo status=error kind={} duration_ms={} error_kind={}",
            E::SPEC.kind,
            started_at.elapsed().as_millis(),
            err.kind().as_str()
        ),
    }
}
