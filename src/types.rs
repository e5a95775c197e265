//! NewType wrappers for strong typing across the server.
//!
//! These types prevent accidental mixing of semantically different strings
//! (e.g., passing an item id where a token subject is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// Subject identifier from a verified credential (the JWT `sub` claim).
    ///
    /// This is the identity provider's stable user id. It is the only value
    /// the identity resolver needs to fetch the full profile record.
    SubjectId
);

newtype_string!(
    /// Identifier of an example data item owned by a user.
    ///
    /// Generated server-side on creation; callers pass it back to update
    /// existing items.
    ItemId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_id_creation() {
        let id = SubjectId::new("user_123");
        assert_eq!(id.as_str(), "user_123");
        assert_eq!(id.to_string(), "user_123");
    }

    #[test]
    fn test_subject_id_from_string() {
        let id: SubjectId = "user_123".into();
        assert_eq!(id.as_str(), "user_123");

        let id: SubjectId = String::from("user_456").into();
        assert_eq!(id.as_str(), "user_456");
    }

    #[test]
    fn test_subject_id_serde() {
        let id = SubjectId::new("user_123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"user_123\"");

        let parsed: SubjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_item_id_equality() {
        let a = ItemId::new("item-1");
        let b = ItemId::new("item-1");
        let c = ItemId::new("item-2");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_into_inner() {
        let id = SubjectId::new("user_123");
        let inner: String = id.into_inner();
        assert_eq!(inner, "user_123");
    }
}
