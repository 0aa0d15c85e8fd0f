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

//! Volatile reference implementation of the storage contract.

use std::collections::VecDeque;

use crate::storage::{StorageBackend, StorageResult};

/// An in-memory [`StorageBackend`] over a `VecDeque`.
///
/// Nothing survives the process; this backend exists as the reference
/// implementation of the contract and as the test double for the queue
/// algorithms. Insertion order is the deque order itself.
#[derive(Debug, Default)]
pub struct MemoryBackend<T> {
    items: VecDeque<T>,
}

impl<T> MemoryBackend<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T: Clone> StorageBackend for MemoryBackend<T> {
    type Item = T;

    fn insert_tail(&mut self, item: T) -> StorageResult<()> {
        self.items.push_back(item);
        Ok(())
    }

    fn extract_head(&mut self) -> StorageResult<Option<T>> { Ok(self.items.pop_front()) }

    fn item_at(&self, offset: usize) -> StorageResult<Option<T>> {
        Ok(self.items.get(offset).cloned())
    }

    fn count(&self) -> StorageResult<usize> { Ok(self.items.len()) }

    fn remove_at(&mut self, offset: usize) -> StorageResult<()> {
        self.items.remove(offset);
        Ok(())
    }

    fn clear_all(&mut self) -> StorageResult<()> {
        self.items.clear();
        Ok(())
    }
}
