//! Bundled directory schema and lookup seeds.
//!
//! Steps run in `version` order inside one transaction and the last applied
//! version is stored in `PRAGMA user_version`. Every open also checks that
//! the city, department and rank tables hold at least one row.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    label: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: [SchemaStep; 2] = [
    SchemaStep {
        version: 1,
        label: "directory_tables",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        label: "lookup_seed",
        sql: include_str!("0002_seed_lookups.sql"),
    },
];

const SEEDED_LOOKUPS: [&str; 3] = ["city", "department", "rank"];

/// Schema version written by the newest bundled step.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS
        .iter()
        .map(|step| step.version)
        .max()
        .unwrap_or(0)
}

/// Brings `conn` up to [`latest_version`] and returns how many steps ran.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let stored: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = latest_version();
    if stored > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > stored)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate module=db status=applied version={} step={}",
            step.version, step.label
        );
    }
    tx.commit()?;

    Ok(pending.len())
}

/// Fails with [`DbError::EmptyLookupTable`] when a lookup table has no rows.
pub fn verify_lookup_seeds(conn: &Connection) -> DbResult<()> {
    for table in SEEDED_LOOKUPS {
        let seeded: bool = conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table});"),
            [],
            |row| row.get(0),
        )?;
        if !seeded {
            return Err(DbError::EmptyLookupTable(table));
        }
    }
    Ok(())
}
