//! Branded ID newtypes for type safety.
//!
//! Tasks and checklists each get a distinct ID type wrapping a `String`, so a
//! checklist ID can never be passed where a task ID is expected. IDs loaded
//! from disk are kept verbatim; freshly created IDs are UUID v7.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a new UUID v7 string (time-ordered).
fn new_v7() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v7())
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a task or subtask.
    TaskId
}

branded_id! {
    /// Unique identifier for a custom checklist.
    ChecklistId
}

impl ChecklistId {
    /// Whether the value has the shape of a hyphenated UUID.
    ///
    /// Older stores wrote the checklist *name* into the id slot; those values
    /// fail this check.
    #[must_use]
    pub fn looks_like_uuid(&self) -> bool {
        self.0.len() == 36 && self.0.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn task_id_new_is_uuid_v7() {
        let id = TaskId::new();
        let parsed = Uuid::parse_str(id.as_str()).expect("should be valid UUID");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn ids_are_unique() {
        let a = TaskId::new();
        let b = TaskId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn from_str_ref_keeps_value() {
        let id = TaskId::from("legacy-42");
        assert_eq!(id.as_str(), "legacy-42");
    }

    #[test]
    fn display_and_deref() {
        let id = ChecklistId::from("groceries");
        assert_eq!(format!("{id}"), "groceries");
        let s: &str = &id;
        assert_eq!(s, "groceries");
    }

    #[test]
    fn borrow_allows_str_lookup() {
        let mut map = HashMap::new();
        let _ = map.insert(TaskId::from("abc"), 1);
        assert_eq!(map.get("abc"), Some(&1));
    }

    #[test]
    fn serde_is_transparent() {
        let id = TaskId::from("serde-test");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"serde-test\"");
        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn looks_like_uuid() {
        assert!(ChecklistId::new().looks_like_uuid());
        assert!(!ChecklistId::from("Weekend chores").looks_like_uuid());
        assert!(!ChecklistId::from("").looks_like_uuid());
    }
}
