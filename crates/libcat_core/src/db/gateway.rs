//! Persistence gateway: scoped connections and parameterized statements.
//!
//! # Responsibility
//! - Acquire one connection per operation and release it on every exit path.
//! - Run parameterized statements and return affected counts, generated ids
//!   or mapped rows.
//! - Bootstrap the schema exactly once when the gateway is opened.
//!
//! # Invariants
//! - Values are always bound as parameters; SQL text never embeds user input.
//! - A failed transaction closure rolls back before the error is returned.

use super::migrations::apply_migrations;
use super::provider::{ConnectionProvider, FileConnectionProvider, MemoryConnectionProvider};
use super::{DbError, DbResult};
use crate::model::EntityId;
use log::{error, info};
use rusqlite::{Connection, Params, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Instant;

/// Entry point for every store access made by repositories.
pub struct Gateway {
    provider: Box<dyn ConnectionProvider>,
}

impl Gateway {
    /// Wraps a provider and applies all pending migrations.
    ///
    /// # Side effects
    /// - Opens one bootstrap connection, released before returning.
    /// - Emits `db_open` logging events with duration and status.
    pub fn open(provider: impl ConnectionProvider + 'static) -> DbResult<Self> {
        let started_at = Instant::now();
        let mode = provider.mode();
        info!("event=db_open module=db status=start mode={mode}");

        let bootstrap = provider
            .connect()
            .and_then(|mut conn| apply_migrations(&mut conn));
        match bootstrap {
            Ok(()) => {
                info!(
                    "event=db_open module=db status=ok mode={mode} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self {
                    provider: Box::new(provider),
                })
            }
            Err(err) => {
                error!(
                    "event=db_open module=db status=error mode={mode} duration_ms={} \
                     error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Opens a file-backed store, creating the file when missing.
    pub fn open_file(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::open(FileConnectionProvider::new(path))
    }

    /// Opens a private in-memory store that lives as long as the gateway.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(MemoryConnectionProvider::new()?)
    }

    pub fn mode(&self) -> &'static str {
        self.provider.mode()
    }

    /// Runs `f` on a connection that is dropped when `f` returns.
    pub fn with_connection<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let conn = self.provider.connect()?;
        f(&conn)
    }

    /// Runs `f` inside an immediate transaction; commits only on `Ok`.
    pub fn with_transaction<T, E>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let mut conn = self.provider.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DbError::from)?;
        let value = f(&tx)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }

    /// Executes one statement and returns the affected row count.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> DbResult<usize> {
        self.with_connection(|conn| conn.execute(sql, params).map_err(DbError::from))
    }

    /// Executes one `INSERT` and returns the store-generated row id.
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> DbResult<EntityId> {
        self.with_connection(|conn| {
            conn.execute(sql, params)?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Runs one query and maps every row with `map_row`.
    pub fn query<T, P, F>(&self, sql: &str, params: P, map_row: F) -> DbResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(params, map_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns the schema version recorded in the store.
    pub fn schema_version(&self) -> DbResult<u32> {
        self.with_connection(|conn| {
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
                .map_err(DbError::from)
        })
    }
}
