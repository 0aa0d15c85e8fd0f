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

//! Schedulable producer/consumer loops around a shared queue.
//!
//! Runners are plain `run()` bodies; the [`App`](crate::App) (or any other
//! host) decides which thread executes them. Queue errors are returned to
//! the host instead of being printed and swallowed inside the loop, so the
//! host can decide between retry and abort.

use std::{fmt, sync::Arc, time::Duration};

use duraq_queue::{BlockingQueue, QueueError, StorageBackend};
use tracing::info;

/// Handles one element pulled off the queue.
pub trait Processor<E>: Send + 'static {
    fn process(&mut self, element: E);
}

impl<E, F> Processor<E> for F
where
    F: FnMut(E) + Send + 'static,
{
    fn process(&mut self, element: E) { self(element) }
}

/// Puts a fixed load of elements onto the queue, in order.
pub struct Producer<B: StorageBackend> {
    queue: Arc<BlockingQueue<B>>,
    load:  Vec<B::Item>,
}

impl<B: StorageBackend> Producer<B> {
    pub fn new(queue: Arc<BlockingQueue<B>>, load: Vec<B::Item>) -> Self { Self { queue, load } }

    /// Enqueues the whole load. Stops at the first failure; elements after
    /// it are not enqueued.
    pub fn run(self) -> duraq_queue::Result<()> {
        let Self { queue, load } = self;
        for element in load {
            queue.put(element)?;
        }
        Ok(())
    }
}

/// Takes elements off the queue until none arrive, handing each to a
/// [`Processor`].
///
/// Without a timeout the loop ends when the queue is closed; with one, it
/// also ends once a wait elapses with no element. Either ending is normal -
/// only storage failures surface as errors.
pub struct Consumer<B: StorageBackend, P> {
    queue:     Arc<BlockingQueue<B>>,
    timeout:   Option<Duration>,
    processor: P,
}

impl<B, P> Consumer<B, P>
where
    B: StorageBackend,
    P: Processor<B::Item>,
{
    pub fn new(queue: Arc<BlockingQueue<B>>, processor: P) -> Self {
        Self {
            queue,
            timeout: None,
            processor,
        }
    }

    pub fn with_timeout(queue: Arc<BlockingQueue<B>>, timeout: Duration, processor: P) -> Self {
        Self {
            queue,
            timeout: Some(timeout),
            processor,
        }
    }

    /// Runs the consume loop; returns the number of elements processed.
    pub fn run(mut self) -> duraq_queue::Result<usize> {
        let mut processed = 0;
        loop {
            let outcome = match self.timeout {
                Some(timeout) => self.queue.take_timeout(timeout),
                None => self.queue.take().map(Some),
            };
            let element = match outcome {
                Ok(element) => element,
                // Close is the shutdown signal, not a failure of this loop.
                Err(QueueError::Cancelled { .. }) => None,
                Err(e) => return Err(e),
            };
            let Some(element) = element else {
                return Ok(processed);
            };
            self.processor.process(element);
            processed += 1;
        }
    }
}

/// Logs a snapshot of everything currently queued, head first, without
/// consuming anything.
pub struct SnapshotConsumer<B: StorageBackend> {
    queue: Arc<BlockingQueue<B>>,
}

impl<B: StorageBackend> SnapshotConsumer<B>
where
    B::Item: fmt::Display,
{
    pub fn new(queue: Arc<BlockingQueue<B>>) -> Self { Self { queue } }

    pub fn run(self) -> duraq_queue::Result<()> {
        let elements = self.queue.to_vec()?;
        info!(len = elements.len(), "queue snapshot");
        for element in &elements {
            info!(%element, "queued");
        }
        Ok(())
    }
}

/// Clears the queue once and stops.
pub struct PurgeConsumer<B: StorageBackend> {
    queue: Arc<BlockingQueue<B>>,
}

impl<B: StorageBackend> PurgeConsumer<B> {
    pub fn new(queue: Arc<BlockingQueue<B>>) -> Self { Self { queue } }

    pub fn run(self) -> duraq_queue::Result<()> {
        self.queue.clear()?;
        info!("queue purged");
        Ok(())
    }
}
