//! Opaque identifiers for catalog records.
//!
//! The remote store assigns identifiers (UUIDs for the hosted table, but
//! numeric keys show up as well), and the model echoes them back in outfit
//! recommendations as either JSON strings or numbers. [`ItemId`] accepts both
//! forms and always compares by its textual representation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Identifier of a wardrobe item, assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Generate a random identifier, the way the hosted table's
    /// `gen_random_uuid()` default does.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the textual form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_string_and_number() {
        let a: ItemId = serde_json::from_str("\"abc-123\"").unwrap();
        assert_eq!(a.as_str(), "abc-123");

        let b: ItemId = serde_json::from_str("7").unwrap();
        assert_eq!(b, ItemId::from(7));
        assert_eq!(b, ItemId::from("7"));
    }

    #[test]
    fn test_rejects_non_scalar() {
        assert!(serde_json::from_str::<ItemId>("{\"id\": 1}").is_err());
        assert!(serde_json::from_str::<ItemId>("1.5").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let id = ItemId::from(12);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"12\"");
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(ItemId::random(), ItemId::random());
    }
}
