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

use std::{
    path::Path,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use duraq_app::{AppConfig, User};
use duraq_storage_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

fn config(path: &Path) -> AppConfig { AppConfig::new(SqliteStoreConfig::new(path)) }

fn create_user(user_id: i64) -> User {
    let guid = uuid::Uuid::new_v4().simple().to_string();
    User::new(user_id, guid, format!("Name{user_id}"))
}

#[test]
fn test_user_queue_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let app = config(&temp_dir.path().join("users.db")).open().unwrap();

    app.add(User::new(1, "a1", "Robert")).unwrap();
    app.add(User::new(2, "a2", "Martin")).unwrap();

    let queue = app.queue();
    let robert = User::new(1, "a1", "Robert");

    // Peek twice in a row: non-removing.
    assert_eq!(queue.peek().unwrap(), Some(robert.clone()));
    assert_eq!(queue.peek().unwrap(), Some(robert.clone()));

    assert_eq!(queue.take().unwrap(), robert);
    assert_eq!(queue.len().unwrap(), 1);

    queue.clear().unwrap();
    assert_eq!(queue.len().unwrap(), 0);

    let taken = queue.take_timeout(Duration::from_millis(100)).unwrap();
    assert_eq!(taken, None);

    app.shutdown().unwrap();
}

#[test]
fn test_take_blocks_until_concurrent_put() {
    let temp_dir = TempDir::new().unwrap();
    let app = config(&temp_dir.path().join("users.db")).open().unwrap();
    let user = create_user(1);
    let sleep = Duration::from_millis(300);

    let taker = {
        let queue = Arc::clone(app.queue());
        thread::spawn(move || {
            let start = Instant::now();
            let taken = queue.take().unwrap();
            (taken, start.elapsed())
        })
    };

    thread::sleep(sleep);
    app.add(user.clone()).unwrap();

    let (taken, elapsed) = taker.join().unwrap();
    assert_eq!(taken, user);
    assert!(elapsed >= sleep);

    app.shutdown().unwrap();
}

#[test]
fn test_load_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("users.db");
    let users: Vec<User> = (0..20).map(create_user).collect();

    {
        let mut app = config(&path).open().unwrap();
        app.produce(users.clone()).unwrap();
        app.shutdown().unwrap();
    }

    let app = config(&path).open().unwrap();
    assert_eq!(app.queue().len().unwrap(), 20);
    for user in &users {
        assert_eq!(app.queue().take().unwrap(), *user);
    }
    app.shutdown().unwrap();
}

#[test]
fn test_drop_data_on_shutdown() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("users.db");

    {
        let mut cfg = config(&path);
        cfg.drop_data_on_shutdown = true;
        let app = cfg.open().unwrap();
        app.add(create_user(1)).unwrap();
        app.shutdown().unwrap();
    }

    let app = config(&path).open().unwrap();
    assert!(app.queue().is_empty().unwrap());
    app.shutdown().unwrap();
}

#[test]
fn test_demo_wiring() {
    let temp_dir = TempDir::new().unwrap();
    let mut app = config(&temp_dir.path().join("users.db")).open().unwrap();

    app.add(User::new(1, "a1", "Robert")).unwrap();
    app.add(User::new(2, "a2", "Martin")).unwrap();
    app.snapshot().unwrap();
    app.purge().unwrap();
    app.snapshot().unwrap();

    app.shutdown().unwrap();
}

#[test]
fn test_timed_consumer_drains_queue() {
    let temp_dir = TempDir::new().unwrap();
    let mut app = config(&temp_dir.path().join("users.db")).open().unwrap();

    for i in 0..10 {
        app.add(create_user(i)).unwrap();
    }
    app.consume(Some(Duration::from_millis(100))).unwrap();

    app.shutdown().unwrap();

    let app = config(&temp_dir.path().join("users.db")).open().unwrap();
    assert!(app.queue().is_empty().unwrap());
    app.shutdown().unwrap();
}
