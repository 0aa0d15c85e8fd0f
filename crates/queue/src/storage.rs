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

//! The storage capability the queue delegates all data operations to.
//!
//! A [`StorageBackend`] is an ordered, positional store: elements are
//! addressed by offset (0 = current head, increasing toward the tail) and by
//! count. Offsets are relative and shift after any insert or removal, so a
//! caller must hold the queue's exclusion lock across every
//! locate-then-mutate pair. The queue guarantees exactly that, which is why
//! backends need no internal synchronization and take `&mut self`.
//!
//! # Invariants
//!
//! - Offsets `0..count-1` enumerate exactly the live elements in FIFO
//!   insertion order, with no gaps. Backends must track an explicit
//!   insertion-order key; physical row order is never good enough.
//! - Each call is its own durability unit: it either fully commits or fails
//!   with [`StorageError`] leaving prior state unchanged. A half-applied
//!   write visible to the next caller is a contract violation.
//!
//! # Implementors
//!
//! - [`MemoryBackend`](crate::MemoryBackend) - volatile, for tests
//! - `SqliteBackend` (in `duraq-storage-sqlite`) - durable

use snafu::Snafu;

/// Storage backend errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StorageError {
    /// The durable effect of an operation could not be committed. Prior
    /// state is unchanged.
    #[snafu(display("{op} was not committed: {message}"))]
    Commit {
        op:      &'static str,
        message: String,
        #[snafu(implicit)]
        loc:     snafu::Location,
    },

    /// A stored payload could not be decoded back into an element.
    #[snafu(display("stored payload could not be decoded: {message}"))]
    Decode {
        message: String,
        #[snafu(implicit)]
        loc:     snafu::Location,
    },

    /// The backend contradicted itself within a single lock hold, e.g. a
    /// non-zero count followed by an empty head read.
    #[snafu(display("backend state is inconsistent: {message}"))]
    Inconsistent {
        message: String,
        #[snafu(implicit)]
        loc:     snafu::Location,
    },
}

/// Result type for storage backend operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A durable, ordered sequence of elements with positional access.
///
/// All methods are synchronous and are only ever invoked while the owning
/// queue holds its exclusion lock.
pub trait StorageBackend {
    /// The element type carried by this backend.
    type Item;

    /// Appends `item` after the current tail. On failure the element must
    /// not be visible to a subsequent [`count`](Self::count).
    fn insert_tail(&mut self, item: Self::Item) -> StorageResult<()>;

    /// Removes and returns the current head, or `None` if empty. Once
    /// returned, the element is gone from all subsequent reads.
    fn extract_head(&mut self) -> StorageResult<Option<Self::Item>>;

    /// Returns the element at `offset` without removing it, or `None` if
    /// `offset` is out of range.
    fn item_at(&self, offset: usize) -> StorageResult<Option<Self::Item>>;

    /// Number of live elements.
    fn count(&self) -> StorageResult<usize>;

    /// Deletes the element currently at `offset`. The offset must have been
    /// located under the same lock hold; a stale offset is undefined.
    fn remove_at(&mut self, offset: usize) -> StorageResult<()>;

    /// Deletes every element.
    fn clear_all(&mut self) -> StorageResult<()>;
}
