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

use std::fmt;

use serde::{Deserialize, Serialize};

/// The demo entity carried through the queue.
///
/// Plain value semantics: two users are equal iff all fields are equal. The
/// queue never mutates a user in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub user_id:   i64,
    pub user_guid: String,
    pub name:      String,
}

impl User {
    pub fn new<G: Into<String>, N: Into<String>>(user_id: i64, user_guid: G, name: N) -> Self {
        Self {
            user_id,
            user_guid: user_guid.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User(id={}, guid={}, name={})",
            self.user_id, self.user_guid, self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_equality() {
        let a = User::new(1, "a1", "Robert");
        let b = User::new(1, "a1", "Robert");
        let c = User::new(2, "a2", "Martin");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        let user = User::new(1, "a1", "Robert");
        assert_eq!(user.to_string(), "User(id=1, guid=a1, name=Robert)");
    }
}
