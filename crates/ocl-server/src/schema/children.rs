//! Concept and mapping views nested in a source GET.

use serde::Serialize;

use ocl_core::{ConceptVersion, Mapping, MappingId};

#[derive(Debug, Clone, Serialize)]
pub struct ConceptDetailView {
    pub id: String,
    pub display_name: String,
    pub display_locale: Option<String>,
    pub concept_class: Option<String>,
    pub datatype: Option<String>,
    pub retired: bool,
}

impl From<&ConceptVersion> for ConceptDetailView {
    fn from(concept: &ConceptVersion) -> Self {
        ConceptDetailView {
            id: concept.mnemonic.clone(),
            display_name: concept.display_name.clone(),
            display_locale: concept.display_locale.clone(),
            concept_class: concept.concept_class.clone(),
            datatype: concept.datatype.clone(),
            retired: concept.retired,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MappingDetailView {
    pub id: MappingId,
    pub map_type: String,
    pub from_concept: String,
    pub to_concept: String,
    pub external_id: Option<String>,
    pub retired: bool,
}

impl From<&Mapping> for MappingDetailView {
    fn from(mapping: &Mapping) -> Self {
        MappingDetailView {
            id: mapping.id,
            map_type: mapping.map_type.clone(),
            from_concept: mapping.from_concept.clone(),
            to_concept: mapping.to_concept.clone(),
            external_id: mapping.external_id.clone(),
            retired: mapping.retired,
        }
    }
}
