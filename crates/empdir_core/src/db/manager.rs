//! Single-handle connection lifecycle.
//!
//! # Responsibility
//! - Lazily open one SQLite handle from [`DbConfig`] and reuse it.
//! - Close and clear that handle on release.
//!
//! # Invariants
//! - After `release` returns (ok or error) no handle is stored.
//! - `acquire`/`release` take `&mut self`; one owner drives a session.

use super::open::open_with_config;
use super::{DbError, DbResult};
use crate::config::DbConfig;
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::time::Instant;

/// Owns the cached database handle for one directory session.
pub struct ConnectionManager {
    config: DbConfig,
    handle: Option<Connection>,
}

impl ConnectionManager {
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            handle: None,
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns the live handle, opening it first when none exists.
    ///
    /// Repeated calls while a handle is live return that same handle.
    ///
    /// # Errors
    /// - Returns `DbError::Sqlite` when the file cannot be opened or bootstrapped.
    /// - Returns `DbError::UnsupportedSchemaVersion` for a newer schema.
    /// - Returns `DbError::EmptyLookupTable` when a lookup table has no rows.
    pub fn acquire(&mut self) -> DbResult<&Connection> {
        if self.handle.is_none() {
            let conn = open_with_config(&self.config)?;
            info!("event=conn_acquire module=db status=ok reused=false");
            self.handle = Some(conn);
        } else {
            debug!("event=conn_acquire module=db status=ok reused=true");
        }

        self.handle.as_ref().ok_or(DbError::NotConnected)
    }

    /// Returns the live handle without opening one.
    pub fn current(&self) -> DbResult<&Connection> {
        self.handle.as_ref().ok_or(DbError::NotConnected)
    }

    /// Closes the live handle, if any, and clears it.
    ///
    /// A close failure is logged and returned, but the handle is already
    /// cleared, so the next `acquire` opens a new one.
    pub fn release(&mut self) -> DbResult<()> {
        let Some(conn) = self.handle.take() else {
            debug!("event=conn_release module=db status=skipped reason=not_connected");
            return Ok(());
        };

        let started_at = Instant::now();
        match conn.close() {
            Ok(()) => {
                info!(
                    "event=conn_release module=db status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err((_unclosed, err)) => {
                error!(
                    "event=conn_release module=db status=error duration_ms={} error_code=db_close_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if self.handle.is_some() {
            warn!("event=conn_release module=db status=start reason=dropped_while_connected");
            let _ = self.release();
        }
    }
}
