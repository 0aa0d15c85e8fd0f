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

use duraq_queue::QueueError;
use snafu::Snafu;

/// Errors from app wiring and worker lifecycle.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AppError {
    #[snafu(transparent)]
    Queue {
        source: QueueError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },

    #[snafu(display("failed to spawn {name} thread"))]
    Spawn {
        name:   String,
        source: std::io::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },

    #[snafu(display("worker {name} panicked"))]
    WorkerPanicked {
        name: String,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },

    #[snafu(display("queue handle still shared at shutdown; store left open"))]
    QueueStillShared {
        #[snafu(implicit)]
        loc: snafu::Location,
    },
}

/// Result type for app operations.
pub type Result<T> = std::result::Result<T, AppError>;
