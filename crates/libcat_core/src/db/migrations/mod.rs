//! Catalog schema steps and the executor that installs them.
//!
//! # Invariants
//! - Step versions start at 1 and increase by one.
//! - The store's version lives in `PRAGMA user_version` and only moves forward.
//! - Every pending step commits together or not at all.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One schema step and the version the store reaches after it.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "catalog",
        sql: include_str!("0001_catalog.sql"),
    },
    SchemaStep {
        version: 2,
        name: "assignments",
        sql: include_str!("0002_assignments.sql"),
    },
];

/// Highest schema version this build can install.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn`'s store up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store is newer than this build.
/// - Any store error raised by a step; nothing is applied in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = stored_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending = pending_steps(from);
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={latest}");
    Ok(())
}

fn pending_steps(from: u32) -> &'static [SchemaStep] {
    let applied = SCHEMA_STEPS
        .iter()
        .take_while(|step| step.version <= from)
        .count();
    &SCHEMA_STEPS[applied..]
}

fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, pending_steps, stored_version, SCHEMA_STEPS};
    use rusqlite::Connection;

    #[test]
    fn step_versions_are_contiguous_from_one() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
    }

    #[test]
    fn pending_steps_skip_applied_versions() {
        assert_eq!(pending_steps(0).len(), SCHEMA_STEPS.len());
        assert_eq!(pending_steps(1)[0].name, "assignments");
        assert!(pending_steps(latest_version()).is_empty());
    }

    #[test]
    fn partially_migrated_store_is_brought_up_to_date() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_STEPS[0].sql).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();

        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();

        assert_eq!(stored_version(&conn).unwrap(), latest_version());
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name LIKE '%_books';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
