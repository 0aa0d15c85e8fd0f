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

//! A blocking FIFO queue whose elements are held in an external store rather
//! than in memory.
//!
//! The store is reached through the narrow positional contract in
//! [`storage`]; the queue layers classic blocking-queue semantics on top of
//! it with a single exclusion lock and a not-empty condition per instance.

pub mod builder;
pub mod config;
pub mod error;
pub mod memory;
pub mod queue;
pub mod storage;

pub use builder::QueueBuilder;
pub use config::QueueConfig;
pub use error::{QueueError, Result};
pub use memory::MemoryBackend;
pub use queue::BlockingQueue;
pub use storage::{StorageBackend, StorageError, StorageResult};
