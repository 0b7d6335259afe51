//! Source versions: point-in-time snapshots of a source's membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{ConceptId, MappingId, SourceId, VersionId};
use crate::source::{Extras, Source};

/// Mnemonic of the version created alongside every new source.
pub const INITIAL_VERSION: &str = "INITIAL";

/// Mnemonic used in URLs to address the latest released version.
pub const LATEST_VERSION: &str = "latest";

/// Source sub-paths that shadow a version of the same name.
pub const RESERVED_VERSION_MNEMONICS: [&str; 3] = [LATEST_VERSION, "versions", "extras"];

/// Whether `mnemonic` is unaddressable as a version because a source
/// sub-path of the same name takes its URL.
pub fn is_reserved_version_mnemonic(mnemonic: &str) -> bool {
    RESERVED_VERSION_MNEMONICS.contains(&mnemonic)
}

/// A snapshot of a source's concept and mapping membership.
///
/// A released version is the source's "latest" version and cannot be
/// deactivated while it stays released.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVersion {
    pub id: VersionId,
    pub mnemonic: String,
    /// The versioned object (parent source).
    pub source: SourceId,
    pub released: bool,
    pub description: Option<String>,
    pub external_id: Option<String>,
    pub extras: Extras,
    pub is_active: bool,
    pub previous_version: Option<String>,
    pub parent_version: Option<String>,
    pub concepts: Vec<ConceptId>,
    pub mappings: Vec<MappingId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SourceVersion {
    /// A new, unreleased, empty version of `source`. The id is assigned by
    /// storage.
    pub fn new(source: SourceId, mnemonic: impl Into<String>) -> Self {
        let now = Utc::now();
        SourceVersion {
            id: VersionId(0),
            mnemonic: mnemonic.into(),
            source,
            released: false,
            description: None,
            external_id: None,
            extras: Extras::new(),
            is_active: true,
            previous_version: None,
            parent_version: None,
            concepts: Vec::new(),
            mappings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The released `INITIAL` version that accompanies a freshly created
    /// source.
    pub fn initial_for(source: &Source) -> Self {
        let mut version = Self::new(source.id, INITIAL_VERSION);
        version.released = true;
        version.description = Some(format!("Initial version of {}", source.name));
        version
    }

    /// Copies concept and mapping membership from `other`.
    pub fn inherit_membership(&mut self, other: &SourceVersion) {
        self.concepts = other.concepts.clone();
        self.mappings = other.mappings.clone();
    }

    /// Relative URL of this version under `source`.
    pub fn url(&self, source: &Source) -> String {
        format!("{}{}/", source.url(), self.mnemonic)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
