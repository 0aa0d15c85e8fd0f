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

use crate::{BlockingQueue, QueueConfig, storage::StorageBackend};

pub struct QueueBuilder<B> {
    backend: B,
    config:  QueueConfig,
}

impl<B: StorageBackend> QueueBuilder<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: QueueConfig::default(),
        }
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn fair(mut self, fair: bool) -> Self {
        self.config.fair = fair;
        self
    }

    pub fn build(self) -> BlockingQueue<B> { BlockingQueue::new(self.backend, self.config) }
}
