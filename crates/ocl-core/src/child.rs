//! Child entities referenced by a version's membership sets.

use serde::{Deserialize, Serialize};

use crate::id::{ConceptId, MappingId};

/// A version of a concept held in a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptVersion {
    pub id: ConceptId,
    pub mnemonic: String,
    pub display_name: String,
    pub display_locale: Option<String>,
    pub concept_class: Option<String>,
    pub datatype: Option<String>,
    pub retired: bool,
    pub is_active: bool,
}

impl ConceptVersion {
    pub fn new(mnemonic: impl Into<String>, display_name: impl Into<String>) -> Self {
        ConceptVersion {
            id: ConceptId(0),
            mnemonic: mnemonic.into(),
            display_name: display_name.into(),
            display_locale: None,
            concept_class: None,
            datatype: None,
            retired: false,
            is_active: true,
        }
    }
}

/// A directed relationship between two concepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub id: MappingId,
    pub map_type: String,
    pub from_concept: String,
    pub to_concept: String,
    pub external_id: Option<String>,
    pub retired: bool,
    pub is_active: bool,
}

impl Mapping {
    pub fn new(
        map_type: impl Into<String>,
        from_concept: impl Into<String>,
        to_concept: impl Into<String>,
    ) -> Self {
        Mapping {
            id: MappingId(0),
            map_type: map_type.into(),
            from_concept: from_concept.into(),
            to_concept: to_concept.into(),
            external_id: None,
            retired: false,
            is_active: true,
        }
    }
}
