//! Connection providers for the persistence gateway.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections on demand.
//! - Configure connection pragmas required by core behavior.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Open failures are always reported as `DbError::Connection`.

use super::{DbError, DbResult};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Supplies a ready-to-use store connection per call.
///
/// Implementations must not hand out the same connection twice; the gateway
/// drops every connection at the end of the operation that requested it.
pub trait ConnectionProvider {
    /// Opens and configures one connection.
    fn connect(&self) -> DbResult<Connection>;

    /// Storage mode tag used in log events (`file|memory`).
    fn mode(&self) -> &'static str;
}

/// Opens a fresh connection to a database file on every call.
#[derive(Debug, Clone)]
pub struct FileConnectionProvider {
    path: PathBuf,
}

impl FileConnectionProvider {
    /// Does no I/O; the file is created on first connect when missing.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionProvider for FileConnectionProvider {
    fn connect(&self) -> DbResult<Connection> {
        let conn = Connection::open(&self.path).map_err(DbError::connection)?;
        configure_connection(&conn)?;
        Ok(conn)
    }

    fn mode(&self) -> &'static str {
        "file"
    }
}

/// Named shared-cache in-memory database.
///
/// SQLite drops a shared in-memory database when its last connection
/// closes, so the provider keeps one idle anchor connection open for its
/// whole lifetime. Every other connection is still scoped per call.
pub struct MemoryConnectionProvider {
    uri: String,
    _anchor: Connection,
}

impl MemoryConnectionProvider {
    pub fn new() -> DbResult<Self> {
        let uri = format!(
            "file:libcat-{}?mode=memory&cache=shared",
            Uuid::new_v4().simple()
        );
        let anchor = open_uri(&uri)?;
        Ok(Self {
            uri,
            _anchor: anchor,
        })
    }
}

impl ConnectionProvider for MemoryConnectionProvider {
    fn connect(&self) -> DbResult<Connection> {
        let conn = open_uri(&self.uri)?;
        configure_connection(&conn)?;
        Ok(conn)
    }

    fn mode(&self) -> &'static str {
        "memory"
    }
}

fn open_uri(uri: &str) -> DbResult<Connection> {
    Connection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(DbError::connection)
}

fn configure_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(DbError::connection)?;
    conn.busy_timeout(BUSY_TIMEOUT).map_err(DbError::connection)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ConnectionProvider, FileConnectionProvider, MemoryConnectionProvider};
    use crate::db::DbError;

    #[test]
    fn memory_provider_connections_share_one_database() {
        let provider = MemoryConnectionProvider::new().unwrap();
        {
            let conn = provider.connect().unwrap();
            conn.execute_batch("CREATE TABLE shelf (v INTEGER); INSERT INTO shelf VALUES (7);")
                .unwrap();
        }
        let conn = provider.connect().unwrap();
        let value: i64 = conn
            .query_row("SELECT v FROM shelf;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn separate_memory_providers_are_isolated() {
        let first = MemoryConnectionProvider::new().unwrap();
        let second = MemoryConnectionProvider::new().unwrap();
        first
            .connect()
            .unwrap()
            .execute_batch("CREATE TABLE only_here (v INTEGER);")
            .unwrap();
        let err = second
            .connect()
            .unwrap()
            .execute("INSERT INTO only_here VALUES (1);", [])
            .unwrap_err();
        assert!(err.to_string().contains("only_here"));
    }

    #[test]
    fn connections_enable_foreign_keys() {
        let provider = MemoryConnectionProvider::new().unwrap();
        let conn = provider.connect().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn missing_parent_directory_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileConnectionProvider::new(dir.path().join("absent").join("catalog.db"));
        let err = provider.connect().unwrap_err();
        assert!(matches!(err, DbError::Connection(_)));
    }
}
