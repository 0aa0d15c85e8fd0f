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

use snafu::Snafu;

use crate::storage::StorageError;

/// Queue operation errors.
///
/// Storage failures and invalid arguments always propagate to the caller;
/// they are never logged and swallowed. An elapsed `take_timeout` is a normal
/// `Ok(None)` return, not an error.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum QueueError {
    /// A caller-supplied argument or configuration value was rejected.
    #[snafu(display("invalid argument: {message}"))]
    InvalidArgument {
        message: String,
        #[snafu(implicit)]
        loc:     snafu::Location,
    },

    /// The queue was closed while the caller was blocked, or before the call
    /// could begin. The queue contents are unchanged.
    #[snafu(display("queue closed"))]
    Cancelled {
        #[snafu(implicit)]
        loc: snafu::Location,
    },

    /// The storage backend failed to commit the requested operation.
    #[snafu(transparent)]
    Storage {
        source: StorageError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
}

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;
