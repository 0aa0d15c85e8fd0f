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

use std::path::Path;

use duraq_queue::{QueueBuilder, QueueError, StorageBackend, StorageError};
use duraq_storage_sqlite::{SqliteBackend, SqliteStoreConfig};
use tempfile::TempDir;

fn open(path: &Path) -> SqliteBackend<String> {
    SqliteBackend::open(SqliteStoreConfig::new(path)).unwrap()
}

#[test]
fn test_insert_extract_fifo() {
    let temp_dir = TempDir::new().unwrap();
    let mut backend = open(&temp_dir.path().join("queue.db"));

    for name in ["a", "b", "c"] {
        backend.insert_tail(name.to_string()).unwrap();
    }

    assert_eq!(backend.count().unwrap(), 3);
    assert_eq!(backend.extract_head().unwrap(), Some("a".to_string()));
    assert_eq!(backend.extract_head().unwrap(), Some("b".to_string()));
    assert_eq!(backend.extract_head().unwrap(), Some("c".to_string()));
    assert_eq!(backend.extract_head().unwrap(), None);
}

#[test]
fn test_order_survives_interleaved_mutations() {
    let temp_dir = TempDir::new().unwrap();
    let mut backend = open(&temp_dir.path().join("queue.db"));

    backend.insert_tail("a".to_string()).unwrap();
    backend.insert_tail("b".to_string()).unwrap();
    backend.insert_tail("c".to_string()).unwrap();

    // Extracting the head and appending afterwards must not let the new row
    // overtake the survivors, even though head seqs were freed.
    assert_eq!(backend.extract_head().unwrap(), Some("a".to_string()));
    backend.insert_tail("d".to_string()).unwrap();

    assert_eq!(backend.item_at(0).unwrap(), Some("b".to_string()));
    assert_eq!(backend.item_at(2).unwrap(), Some("d".to_string()));
    assert_eq!(backend.item_at(3).unwrap(), None);

    backend.remove_at(1).unwrap();
    assert_eq!(backend.count().unwrap(), 2);
    assert_eq!(backend.item_at(1).unwrap(), Some("d".to_string()));
}

#[test]
fn test_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("queue.db");

    {
        let mut backend = open(&path);
        for i in 0..50 {
            backend.insert_tail(format!("element-{i}")).unwrap();
        }
        backend.close(false).unwrap();
    }

    let mut backend = open(&path);
    assert_eq!(backend.count().unwrap(), 50);
    for i in 0..50 {
        assert_eq!(
            backend.extract_head().unwrap(),
            Some(format!("element-{i}"))
        );
    }
}

#[test]
fn test_close_with_drop_data() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("queue.db");

    let mut backend = open(&path);
    backend.insert_tail("gone".to_string()).unwrap();
    backend.close(true).unwrap();

    let backend = open(&path);
    assert_eq!(backend.count().unwrap(), 0);
}

#[test]
fn test_clear_all() {
    let temp_dir = TempDir::new().unwrap();
    let mut backend = open(&temp_dir.path().join("queue.db"));

    for i in 0..10 {
        backend.insert_tail(i.to_string()).unwrap();
    }
    backend.clear_all().unwrap();

    assert_eq!(backend.count().unwrap(), 0);
    assert_eq!(backend.extract_head().unwrap(), None);
}

#[test]
fn test_invalid_table_name_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config =
        SqliteStoreConfig::new(temp_dir.path().join("queue.db")).table("bad name; DROP TABLE x");

    let result = SqliteBackend::<String>::open(config);
    assert!(matches!(result, Err(QueueError::InvalidArgument { .. })));
}

#[test]
fn test_undecodable_payload_surfaces_and_stays() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("queue.db");

    {
        let backend = open(&path);
        backend.close(false).unwrap();
    }
    {
        // Corrupt the store behind the backend's back.
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute(
            "INSERT INTO queue_entry (payload) VALUES (?1)",
            ["not json"],
        )
        .unwrap();
    }

    let mut backend: SqliteBackend<u32> = SqliteBackend::open(SqliteStoreConfig::new(&path)).unwrap();
    let result = backend.extract_head();
    assert!(matches!(result, Err(StorageError::Decode { .. })));
    // The failed extract rolled back; the row is still there.
    assert_eq!(backend.count().unwrap(), 1);
}

#[test]
fn test_queue_over_sqlite_smoke() {
    let temp_dir = TempDir::new().unwrap();
    let backend: SqliteBackend<String> = open(&temp_dir.path().join("queue.db"));
    let queue = QueueBuilder::new(backend).name("sqlite-smoke").build();

    queue.put("first".to_string()).unwrap();
    queue.put("second".to_string()).unwrap();

    assert_eq!(queue.peek().unwrap(), Some("first".to_string()));
    assert_eq!(queue.take().unwrap(), "first".to_string());
    assert_eq!(queue.len().unwrap(), 1);

    queue.into_backend().close(false).unwrap();
}
