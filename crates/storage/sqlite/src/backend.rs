// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Durable [`StorageBackend`] over an embedded SQLite database.
//!
//! Elements are serialized to JSON and stored one row each, keyed by a
//! `seq INTEGER PRIMARY KEY AUTOINCREMENT` column. Every read and delete
//! orders by `seq`, never by physical row order, and `AUTOINCREMENT` keeps
//! the key monotonic even after head rows are deleted - FIFO therefore
//! survives interleaved inserts, extracts, and process restarts.
//!
//! Each operation is a single implicitly-atomic statement or an explicit
//! transaction, so a failed call never leaves a half-applied write behind.
//! The backend is always driven under the owning queue's exclusion lock and
//! holds a single connection with no locking of its own.

use std::{marker::PhantomData, time::Duration};

use duraq_queue::{
    error::InvalidArgumentSnafu,
    storage::{CommitSnafu, DecodeSnafu, InconsistentSnafu},
    StorageBackend, StorageError, StorageResult,
};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde::{Serialize, de::DeserializeOwned};
use snafu::ensure;
use tracing::info;

use crate::SqliteStoreConfig;

/// Statement text, fixed at open time once the table name is validated.
struct Sql {
    insert:    String,
    head:      String,
    delete:    String,
    item_at:   String,
    count:     String,
    remove_at: String,
    clear:     String,
}

impl Sql {
    fn new(table: &str) -> Self {
        Self {
            insert:    format!("INSERT INTO {table} (payload) VALUES (?1)"),
            head:      format!("SELECT seq, payload FROM {table} ORDER BY seq ASC LIMIT 1"),
            delete:    format!("DELETE FROM {table} WHERE seq = ?1"),
            item_at:   format!(
                "SELECT payload FROM {table} ORDER BY seq ASC LIMIT 1 OFFSET ?1"
            ),
            count:     format!("SELECT COUNT(*) FROM {table}"),
            remove_at: format!(
                "DELETE FROM {table} WHERE seq = \
                 (SELECT seq FROM {table} ORDER BY seq ASC LIMIT 1 OFFSET ?1)"
            ),
            clear:     format!("DELETE FROM {table}"),
        }
    }
}

/// A [`StorageBackend`] persisting elements in a SQLite table.
///
/// Constructed by [`open`](Self::open), torn down by [`close`](Self::close).
/// There is no global registry: callers own the value and typically hand it
/// straight to a queue builder.
pub struct SqliteBackend<E> {
    conn:    Connection,
    table:   String,
    sql:     Sql,
    _marker: PhantomData<fn() -> E>,
}

impl<E> SqliteBackend<E>
where
    E: Serialize + DeserializeOwned,
{
    /// Opens (or creates) the database file and the queue table.
    ///
    /// Idempotent: opening an existing store picks up the elements it
    /// already holds.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidArgument` if the configured table name is not a
    /// plain SQL identifier, or with a storage error if the database cannot
    /// be opened or the schema cannot be created.
    pub fn open(config: SqliteStoreConfig) -> duraq_queue::Result<Self> {
        validate_table_name(&config.table)?;

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let conn =
            Connection::open_with_flags(&config.path, flags).map_err(commit_err("open store"))?;

        conn.execute_batch(&format!(
            "PRAGMA journal_mode = {};",
            config.journal_mode.pragma_value()
        ))
        .map_err(commit_err("apply journal mode"))?;
        conn.execute_batch(&format!(
            "PRAGMA synchronous = {};",
            config.sync_mode.pragma_value()
        ))
        .map_err(commit_err("apply sync mode"))?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(commit_err("apply busy timeout"))?;

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                payload TEXT NOT NULL
            );",
            config.table
        ))
        .map_err(commit_err("create schema"))?;

        info!(path = ?config.path, table = %config.table, "sqlite store opened");

        Ok(Self {
            conn,
            sql: Sql::new(&config.table),
            table: config.table,
            _marker: PhantomData,
        })
    }

    /// Closes the store, optionally dropping the queue table and its data.
    pub fn close(self, drop_data: bool) -> duraq_queue::Result<()> {
        let Self { conn, table, .. } = self;
        if drop_data {
            conn.execute_batch(&format!("DROP TABLE IF EXISTS {table}"))
                .map_err(commit_err("drop table"))?;
        }
        conn.close()
            .map_err(|(_conn, e)| commit_err("close store")(e))?;
        info!(table = %table, drop_data, "sqlite store closed");
        Ok(())
    }

    /// Name of the table backing this store.
    #[must_use]
    pub fn table(&self) -> &str { &self.table }

    fn decode(payload: &str) -> StorageResult<E> {
        serde_json::from_str(payload).map_err(|e| {
            DecodeSnafu {
                message: e.to_string(),
            }
            .build()
        })
    }
}

impl<E> StorageBackend for SqliteBackend<E>
where
    E: Serialize + DeserializeOwned,
{
    type Item = E;

    fn insert_tail(&mut self, item: E) -> StorageResult<()> {
        let payload = serde_json::to_string(&item).map_err(|e| {
            CommitSnafu {
                op:      "insert tail",
                message: e.to_string(),
            }
            .build()
        })?;
        self.conn
            .execute(&self.sql.insert, params![payload])
            .map_err(commit_err("insert tail"))?;
        Ok(())
    }

    fn extract_head(&mut self) -> StorageResult<Option<E>> {
        let tx = self
            .conn
            .transaction()
            .map_err(commit_err("extract head"))?;

        let head: Option<(i64, String)> = tx
            .query_row(&self.sql.head, [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .map_err(commit_err("extract head"))?;

        let Some((seq, payload)) = head else {
            return Ok(None);
        };
        // Decode before deleting: a rollback on failure keeps the row.
        let item = Self::decode(&payload)?;

        tx.execute(&self.sql.delete, params![seq])
            .map_err(commit_err("extract head"))?;
        tx.commit().map_err(commit_err("extract head"))?;

        Ok(Some(item))
    }

    fn item_at(&self, offset: usize) -> StorageResult<Option<E>> {
        let payload: Option<String> = self
            .conn
            .query_row(&self.sql.item_at, params![offset_param(offset)], |row| {
                row.get(0)
            })
            .optional()
            .map_err(commit_err("read item"))?;

        payload.as_deref().map(Self::decode).transpose()
    }

    fn count(&self) -> StorageResult<usize> {
        let count: i64 = self
            .conn
            .query_row(&self.sql.count, [], |row| row.get(0))
            .map_err(commit_err("count"))?;
        usize::try_from(count).map_err(|_| {
            InconsistentSnafu {
                message: format!("negative row count {count}"),
            }
            .build()
        })
    }

    fn remove_at(&mut self, offset: usize) -> StorageResult<()> {
        self.conn
            .execute(&self.sql.remove_at, params![offset_param(offset)])
            .map_err(commit_err("remove item"))?;
        Ok(())
    }

    fn clear_all(&mut self) -> StorageResult<()> {
        self.conn
            .execute(&self.sql.clear, [])
            .map_err(commit_err("clear"))?;
        Ok(())
    }
}

/// Maps a rusqlite failure into the storage contract's commit error.
fn commit_err(op: &'static str) -> impl Fn(rusqlite::Error) -> StorageError {
    move |e| {
        CommitSnafu {
            op,
            message: e.to_string(),
        }
        .build()
    }
}

/// Offsets beyond `i64::MAX` cannot exist in a SQLite table; saturating
/// keeps the lookup total and it simply finds no row.
fn offset_param(offset: usize) -> i64 { i64::try_from(offset).unwrap_or(i64::MAX) }

/// The table name is interpolated into statement text, so it must be a
/// plain identifier.
fn validate_table_name(table: &str) -> duraq_queue::Result<()> {
    let mut chars = table.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    ensure!(
        starts_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        InvalidArgumentSnafu {
            message: format!("table name {table:?} is not a plain SQL identifier"),
        }
    );
    Ok(())
}
