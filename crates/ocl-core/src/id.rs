//! Stable ID newtypes for dictionary entities.
//!
//! All IDs are distinct newtype wrappers over `i64` (aligned with SQLite's
//! `INTEGER PRIMARY KEY`), so that a `ConceptId` cannot be accidentally used
//! where a `MappingId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable source identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub i64);

/// Stable source version identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionId(pub i64);

/// Concept version identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConceptId(pub i64);

/// Mapping identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MappingId(pub i64);

// Display implementations -- just print the inner value.

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_id_display() {
        assert_eq!(format!("{}", SourceId(7)), "7");
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&ConceptId(42)).unwrap();
        assert_eq!(json, "42");
        let back: ConceptId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ConceptId(42));
    }

    #[test]
    fn ids_order_by_inner_value() {
        let mut ids = vec![MappingId(3), MappingId(1), MappingId(2)];
        ids.sort();
        assert_eq!(ids, vec![MappingId(1), MappingId(2), MappingId(3)]);
    }
}
