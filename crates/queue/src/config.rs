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

#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Name used in log events, not semantically significant.
    pub name: String,
    /// Lock handoff policy. When `true`, threads blocked on the queue's
    /// exclusion lock acquire it in first-blocked-first-served order; when
    /// `false` the acquisition order is unspecified, favoring throughput.
    pub fair: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: "duraq".to_string(),
            fair: false,
        }
    }
}
