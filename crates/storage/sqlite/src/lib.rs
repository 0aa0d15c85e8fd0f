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

//! Persistence bootstrap for the duraq blocking queue: a durable
//! [`duraq_queue::StorageBackend`] over an embedded SQLite file.

pub mod backend;
pub mod config;

pub use backend::SqliteBackend;
pub use config::{JournalMode, SqliteStoreConfig, SyncMode};
