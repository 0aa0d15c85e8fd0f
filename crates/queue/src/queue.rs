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

//! The blocking queue coordination engine.
//!
//! [`BlockingQueue`] orders elements FIFO: the head is the element that has
//! been on the queue the longest, the tail the one that arrived last. New
//! elements are inserted at the tail; retrieval operates on the head. The
//! elements themselves live in a [`StorageBackend`], not in memory - the
//! queue owns only the exclusion lock, the not-empty condition, and the
//! backend handle.
//!
//! Every operation that inspects queue shape (`count`, `item_at`) or mutates
//! it runs under one exclusion lock per queue instance, so the backend never
//! sees concurrent access and blocking decisions are never made on a stale
//! shape. There is no capacity bound: `put` can only block on lock
//! contention, never waiting for space.
//!
//! ## Usage
//!
//! ```
//! use duraq_queue::{MemoryBackend, QueueBuilder};
//!
//! let queue = QueueBuilder::new(MemoryBackend::new()).name("jobs").build();
//!
//! queue.put("first").unwrap();
//! queue.put("second").unwrap();
//!
//! assert_eq!(queue.peek().unwrap(), Some("first"));
//! assert_eq!(queue.take().unwrap(), "first");
//! assert_eq!(queue.len().unwrap(), 1);
//! ```

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::{
    QueueConfig, Result,
    error::CancelledSnafu,
    storage::{InconsistentSnafu, StorageBackend},
};

/// State guarded by the queue's exclusion lock.
struct Inner<B> {
    backend: B,
    closed:  bool,
}

/// A blocking FIFO queue whose elements live in a [`StorageBackend`].
///
/// The queue is safe to share across threads (wrap it in an `Arc`). A thread
/// calling [`take`](Self::take) on an empty queue releases the lock and parks
/// on the not-empty condition until a [`put`](Self::put) signals it; all
/// other operations run to completion without suspending.
///
/// [`close`](Self::close) wakes every parked waiter; blocked and subsequent
/// calls that would otherwise wait fail with
/// [`QueueError::Cancelled`](crate::QueueError::Cancelled), leaving the
/// backend untouched. Elements already stored can still be drained after
/// close.
pub struct BlockingQueue<B: StorageBackend> {
    /// Main lock guarding all backend access.
    inner:     Mutex<Inner<B>>,
    /// Condition for waiting takes.
    not_empty: Condvar,
    config:    QueueConfig,
}

impl<B: StorageBackend> BlockingQueue<B> {
    pub(crate) fn new(backend: B, config: QueueConfig) -> Self {
        info!(name = %config.name, fair = config.fair, "queue initialized");
        Self {
            inner: Mutex::new(Inner {
                backend,
                closed: false,
            }),
            not_empty: Condvar::new(),
            config,
        }
    }

    /// Inserts `element` at the tail of the queue and signals one waiter
    /// blocked in [`take`](Self::take).
    ///
    /// # Errors
    ///
    /// Fails with `Cancelled` if the queue is closed, or with a storage
    /// error if the backend write did not commit - in which case the element
    /// is not enqueued.
    pub fn put(&self, element: B::Item) -> Result<()> {
        self.locked(|inner| {
            snafu::ensure!(!inner.closed, CancelledSnafu);
            inner.backend.insert_tail(element)?;
            self.not_empty.notify_one();
            Ok(())
        })
    }

    /// Removes and returns the head of the queue, waiting if necessary until
    /// an element becomes available.
    ///
    /// # Errors
    ///
    /// Fails with `Cancelled` if the queue is closed while waiting (or is
    /// already closed and empty); the queue contents are unchanged. Storage
    /// failures propagate.
    pub fn take(&self) -> Result<B::Item> {
        let mut inner = self.inner.lock();
        let result = loop {
            match Self::try_extract(&mut inner) {
                Ok(Some(element)) => break Ok(element),
                Ok(None) => {
                    if inner.closed {
                        break CancelledSnafu.fail();
                    }
                    self.not_empty.wait(&mut inner);
                }
                Err(e) => break Err(e),
            }
        };
        self.release(inner);
        result
    }

    /// Removes and returns the head of the queue, waiting up to `timeout`
    /// for an element to become available.
    ///
    /// Returns `Ok(None)` if the timeout elapses first; that is a normal
    /// outcome, not an error. The remaining wait time is tracked across
    /// spurious wakeups.
    ///
    /// # Errors
    ///
    /// Fails with `Cancelled` if the queue is closed while waiting and no
    /// element remains. Storage failures propagate.
    pub fn take_timeout(&self, timeout: Duration) -> Result<Option<B::Item>> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        let result = loop {
            match Self::try_extract(&mut inner) {
                Ok(Some(element)) => break Ok(Some(element)),
                Ok(None) => {
                    if inner.closed {
                        break CancelledSnafu.fail();
                    }
                    if self.not_empty.wait_until(&mut inner, deadline).timed_out() {
                        // Deadline passed; one last look in case the signal
                        // and the timeout raced.
                        break Self::try_extract(&mut inner);
                    }
                }
                Err(e) => break Err(e),
            }
        };
        self.release(inner);
        result
    }

    /// Returns the head of the queue without removing it, or `None` if the
    /// queue is empty.
    pub fn peek(&self) -> Result<Option<B::Item>> {
        self.locked(|inner| Ok(inner.backend.item_at(0)?))
    }

    /// Number of elements currently in the queue.
    pub fn len(&self) -> Result<usize> { self.locked(|inner| Ok(inner.backend.count()?)) }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> Result<bool> { Ok(self.len()? == 0) }

    /// Returns `true` if the queue contains an element equal to `value`.
    pub fn contains(&self, value: &B::Item) -> Result<bool>
    where
        B::Item: PartialEq,
    {
        self.locked(|inner| {
            let count = inner.backend.count()?;
            for offset in 0..count {
                match inner.backend.item_at(offset)? {
                    Some(item) if item == *value => return Ok(true),
                    Some(_) => {}
                    None => break,
                }
            }
            Ok(false)
        })
    }

    /// Removes the first element equal to `value`, if present.
    ///
    /// Returns `true` if an element was removed. The whole scan holds the
    /// lock, so the located offset cannot go stale before `remove_at`.
    pub fn remove(&self, value: &B::Item) -> Result<bool>
    where
        B::Item: PartialEq,
    {
        self.locked(|inner| {
            let count = inner.backend.count()?;
            for offset in 0..count {
                match inner.backend.item_at(offset)? {
                    Some(item) if item == *value => {
                        inner.backend.remove_at(offset)?;
                        return Ok(true);
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            Ok(false)
        })
    }

    /// Snapshots all elements, head first, into a new `Vec`. The queue is
    /// unaffected.
    pub fn to_vec(&self) -> Result<Vec<B::Item>> {
        self.locked(|inner| {
            let count = inner.backend.count()?;
            let mut items = Vec::with_capacity(count);
            for offset in 0..count {
                match inner.backend.item_at(offset)? {
                    Some(item) => items.push(item),
                    None => break,
                }
            }
            Ok(items)
        })
    }

    /// Removes every available element and appends each to `sink` in FIFO
    /// order. Returns the number of elements transferred.
    pub fn drain_to(&self, sink: &mut Vec<B::Item>) -> Result<usize> {
        self.drain_to_limit(sink, usize::MAX)
    }

    /// Removes at most `max` elements and appends each to `sink` in FIFO
    /// order. Returns the number of elements transferred.
    pub fn drain_to_limit(&self, sink: &mut Vec<B::Item>, max: usize) -> Result<usize> {
        if max == 0 {
            return Ok(0);
        }
        self.locked(|inner| {
            let count = inner.backend.count()?.min(max);
            let mut transferred = 0;
            for _ in 0..count {
                match inner.backend.extract_head()? {
                    Some(item) => {
                        sink.push(item);
                        transferred += 1;
                    }
                    None => break,
                }
            }
            debug!(transferred, "queue drained");
            Ok(transferred)
        })
    }

    /// Removes all elements. Afterwards [`len`](Self::len) is zero.
    pub fn clear(&self) -> Result<()> { self.locked(|inner| Ok(inner.backend.clear_all()?)) }

    /// Closes the queue and wakes every waiter parked in
    /// [`take`](Self::take) / [`take_timeout`](Self::take_timeout).
    ///
    /// After close, `put` fails with `Cancelled` immediately; `take` keeps
    /// returning stored elements until the backend is empty and then fails
    /// with `Cancelled`. Closing an already-closed queue has no effect.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if !inner.closed {
            inner.closed = true;
            info!(name = %self.config.name, "queue closed");
        }
        self.not_empty.notify_all();
        self.release(inner);
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        let inner = self.inner.lock();
        let closed = inner.closed;
        self.release(inner);
        closed
    }

    /// Consumes the queue and hands back its storage backend, e.g. to close
    /// a durable store cleanly.
    pub fn into_backend(self) -> B { self.inner.into_inner().backend }

    /// Get the queue configuration.
    #[must_use]
    pub fn config(&self) -> &QueueConfig { &self.config }

    /// Extracts the head if one is present. Call only while holding the
    /// lock.
    fn try_extract(inner: &mut Inner<B>) -> Result<Option<B::Item>> {
        if inner.backend.count()? == 0 {
            return Ok(None);
        }
        match inner.backend.extract_head()? {
            Some(element) => Ok(Some(element)),
            None => Err(InconsistentSnafu {
                message: "count was non-zero but the head read came back empty",
            }
            .build()
            .into()),
        }
    }

    /// Runs `f` under the lock, releasing it per the fairness policy on the
    /// way out.
    fn locked<R>(&self, f: impl FnOnce(&mut Inner<B>) -> Result<R>) -> Result<R> {
        let mut inner = self.inner.lock();
        let result = f(&mut inner);
        self.release(inner);
        result
    }

    /// Every lock release goes through here so the construction-time
    /// fairness policy applies on all exit paths.
    fn release(&self, guard: MutexGuard<'_, Inner<B>>) {
        if self.config.fair {
            MutexGuard::unlock_fair(guard);
        } else {
            drop(guard);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MemoryBackend, QueueBuilder, QueueError,
        storage::{CommitSnafu, StorageResult},
    };

    fn queue() -> BlockingQueue<MemoryBackend<String>> {
        QueueBuilder::new(MemoryBackend::new()).build()
    }

    #[test]
    fn test_put_take_fifo() {
        let q = queue();
        for i in 0..10 {
            q.put(format!("element-{i}")).unwrap();
        }
        for i in 0..10 {
            assert_eq!(q.take().unwrap(), format!("element-{i}"));
        }
        assert!(q.is_empty().unwrap());
    }

    #[test]
    fn test_peek_does_not_remove() {
        let q = queue();
        q.put("head".to_string()).unwrap();
        q.put("tail".to_string()).unwrap();

        assert_eq!(q.peek().unwrap(), Some("head".to_string()));
        assert_eq!(q.peek().unwrap(), Some("head".to_string()));
        assert_eq!(q.len().unwrap(), 2);
    }

    #[test]
    fn test_peek_empty() {
        assert_eq!(queue().peek().unwrap(), None);
    }

    #[test]
    fn test_take_timeout_elapses() {
        let q = queue();
        let start = Instant::now();
        let taken = q.take_timeout(Duration::from_millis(50)).unwrap();
        assert_eq!(taken, None);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_contains_and_remove() {
        let q = queue();
        for name in ["a", "b", "c"] {
            q.put(name.to_string()).unwrap();
        }

        assert!(q.contains(&"b".to_string()).unwrap());
        assert!(!q.contains(&"z".to_string()).unwrap());

        assert!(q.remove(&"b".to_string()).unwrap());
        assert!(!q.remove(&"b".to_string()).unwrap());
        assert_eq!(q.to_vec().unwrap(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_clear() {
        let q = queue();
        for i in 0..5 {
            q.put(i.to_string()).unwrap();
        }
        q.clear().unwrap();
        assert_eq!(q.len().unwrap(), 0);
    }

    #[test]
    fn test_close_fails_put_and_empty_take() {
        let q = queue();
        q.put("left-over".to_string()).unwrap();
        q.close();

        assert!(matches!(
            q.put("rejected".to_string()),
            Err(QueueError::Cancelled { .. })
        ));
        // Stored elements drain out before cancellation kicks in.
        assert_eq!(q.take().unwrap(), "left-over");
        assert!(matches!(q.take(), Err(QueueError::Cancelled { .. })));
        assert!(q.is_closed());
    }

    /// Backend whose writes fail; reads behave normally.
    struct FailingBackend {
        inner: MemoryBackend<String>,
        fail:  bool,
    }

    impl StorageBackend for FailingBackend {
        type Item = String;

        fn insert_tail(&mut self, item: String) -> StorageResult<()> {
            if self.fail {
                return CommitSnafu {
                    op:      "insert tail",
                    message: "disk full".to_string(),
                }
                .fail();
            }
            self.inner.insert_tail(item)
        }

        fn extract_head(&mut self) -> StorageResult<Option<String>> {
            self.inner.extract_head()
        }

        fn item_at(&self, offset: usize) -> StorageResult<Option<String>> {
            self.inner.item_at(offset)
        }

        fn count(&self) -> StorageResult<usize> { self.inner.count() }

        fn remove_at(&mut self, offset: usize) -> StorageResult<()> {
            self.inner.remove_at(offset)
        }

        fn clear_all(&mut self) -> StorageResult<()> { self.inner.clear_all() }
    }

    #[test]
    fn test_failed_put_leaves_queue_unchanged() {
        let q = QueueBuilder::new(FailingBackend {
            inner: MemoryBackend::new(),
            fail:  true,
        })
        .build();

        let result = q.put("doomed".to_string());
        assert!(matches!(result, Err(QueueError::Storage { .. })));
        assert_eq!(q.len().unwrap(), 0);
    }
}
