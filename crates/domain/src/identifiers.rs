//! Strongly-typed identifier types for the StudyHub domain.
//!
//! Every aggregate gets its own identifier type so a `GroupId` can never be
//! passed where a `QuestionId` is expected. All IDs use UUID v7, which keeps
//! documents roughly ordered by creation time.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new ID with a time-ordered UUID v7
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Create an ID from an existing UUID
            #[inline]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get a reference to the underlying UUID
            #[inline]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Convert to the underlying UUID
            #[inline]
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(UserId, "Unique identifier for users");

define_id!(GroupId, "Unique identifier for study groups");

define_id!(QuestionId, "Unique identifier for questions posted to a group");

define_id!(FeedbackId, "Unique identifier for a feedback entry on a question");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = GroupId::new();
        assert_ne!(id.to_string(), "");
    }

    #[test]
    fn test_id_equality() {
        let uuid = Uuid::now_v7();
        let id1 = QuestionId::from_uuid(uuid);
        let id2 = QuestionId::from_uuid(uuid);
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_id_from_string() {
        let id1 = GroupId::new();
        let s = id1.to_string();
        let id2: GroupId = s.parse().unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_id_from_invalid_string() {
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let deserialized: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
