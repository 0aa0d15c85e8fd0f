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

//! Wiring for a durable user queue: one SQLite-backed blocking queue shared
//! by producer and consumer workers, with explicit construction and a
//! graceful shutdown path. There is no process-wide singleton; the [`App`]
//! owns the queue and every worker it spawns.

pub mod err;
pub mod runner;
pub mod user;

use std::{sync::Arc, thread, time::Duration};

use duraq_queue::{BlockingQueue, QueueBuilder};
use duraq_storage_sqlite::{SqliteBackend, SqliteStoreConfig};
use snafu::ResultExt;
use tracing::{info, warn};

pub use crate::{
    err::{AppError, Result},
    runner::{Consumer, Processor, Producer, PurgeConsumer, SnapshotConsumer},
    user::User,
};
use crate::err::{QueueStillSharedSnafu, SpawnSnafu, WorkerPanickedSnafu};

/// The queue type the app wires together.
pub type UserQueue = BlockingQueue<SqliteBackend<User>>;

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backing store configuration.
    pub store: SqliteStoreConfig,
    /// Lock handoff policy for the queue.
    pub fair: bool,
    /// Whether shutdown drops the stored data or keeps it for the next run.
    pub drop_data_on_shutdown: bool,
}

impl AppConfig {
    pub fn new(store: SqliteStoreConfig) -> Self {
        Self {
            store,
            fair: false,
            drop_data_on_shutdown: false,
        }
    }

    /// Opens the store and wraps it in a queue, returning the running app.
    pub fn open(self) -> Result<App> {
        let backend = SqliteBackend::open(self.store)?;
        let queue = Arc::new(
            QueueBuilder::new(backend)
                .name("users")
                .fair(self.fair)
                .build(),
        );
        info!("app started");
        Ok(App {
            queue,
            producers: Vec::new(),
            consumers: Vec::new(),
            drop_data: self.drop_data_on_shutdown,
        })
    }
}

type WorkerHandle = thread::JoinHandle<duraq_queue::Result<()>>;

/// Owns the queue and the worker threads operating on it.
///
/// Producers and consumers are tracked separately so shutdown can join
/// producers before the queue closes (their loads finish naturally) and
/// close the queue before joining consumers (a blocked `take` needs the
/// close signal to wake up).
pub struct App {
    queue:     Arc<UserQueue>,
    producers: Vec<WorkerHandle>,
    consumers: Vec<WorkerHandle>,
    drop_data: bool,
}

impl App {
    /// Enqueues a single user from the calling thread.
    pub fn add(&self, user: User) -> Result<()> {
        self.queue.put(user)?;
        Ok(())
    }

    /// Spawns a producer worker enqueueing `load` in order.
    pub fn produce(&mut self, load: Vec<User>) -> Result<()> {
        let producer = Producer::new(Arc::clone(&self.queue), load);
        let handle = spawn_worker("duraq-producer", move || producer.run())?;
        self.producers.push(handle);
        Ok(())
    }

    /// Spawns a consumer worker that logs each user it takes. Without a
    /// timeout the worker runs until shutdown closes the queue; with one it
    /// stops after a wait elapses empty.
    pub fn consume(&mut self, timeout: Option<Duration>) -> Result<()> {
        let queue = Arc::clone(&self.queue);
        let process = |user: User| info!(%user, "consumed");
        let handle = spawn_worker("duraq-consumer", move || {
            let consumer = match timeout {
                Some(timeout) => Consumer::with_timeout(queue, timeout, process),
                None => Consumer::new(queue, process),
            };
            let processed = consumer.run()?;
            info!(processed, "consumer finished");
            Ok(())
        })?;
        self.consumers.push(handle);
        Ok(())
    }

    /// Spawns a worker that logs a snapshot of the queued users.
    pub fn snapshot(&mut self) -> Result<()> {
        let consumer = SnapshotConsumer::new(Arc::clone(&self.queue));
        let handle = spawn_worker("duraq-snapshot", move || consumer.run())?;
        self.consumers.push(handle);
        Ok(())
    }

    /// Spawns a worker that clears the queue once.
    pub fn purge(&mut self) -> Result<()> {
        let consumer = PurgeConsumer::new(Arc::clone(&self.queue));
        let handle = spawn_worker("duraq-purge", move || consumer.run())?;
        self.consumers.push(handle);
        Ok(())
    }

    /// Shared handle to the underlying queue.
    #[must_use]
    pub fn queue(&self) -> &Arc<UserQueue> { &self.queue }

    /// Joins producers, closes the queue, joins consumers, closes the store.
    ///
    /// Producers get to finish their loads before the close; consumers
    /// blocked in `take` need the close to wake up. Worker failures are
    /// reported through the returned result (first one wins); the store is
    /// closed regardless.
    pub fn shutdown(self) -> Result<()> {
        let Self {
            queue,
            producers,
            consumers,
            drop_data,
        } = self;

        let mut first_error: Option<AppError> = None;
        join_workers(producers, &mut first_error);

        queue.close();
        join_workers(consumers, &mut first_error);

        let backend = Arc::try_unwrap(queue)
            .map_err(|_| QueueStillSharedSnafu.build())?
            .into_backend();
        backend.close(drop_data)?;

        info!("app shutdown complete");
        first_error.map_or(Ok(()), Err)
    }
}

fn spawn_worker(
    name: &'static str,
    f: impl FnOnce() -> duraq_queue::Result<()> + Send + 'static,
) -> Result<WorkerHandle> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .context(SpawnSnafu { name })
}

fn join_workers(workers: Vec<WorkerHandle>, first_error: &mut Option<AppError>) {
    for worker in workers {
        let name = worker
            .thread()
            .name()
            .unwrap_or("duraq-worker")
            .to_string();
        match worker.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(worker = %name, error = %e, "worker failed");
                first_error.get_or_insert(e.into());
            }
            Err(_) => {
                warn!(worker = %name, "worker panicked");
                first_error.get_or_insert_with(|| WorkerPanickedSnafu { name }.build());
            }
        }
    }
}
