//! The [`DictionaryStore`] trait defining the storage contract for sources,
//! their versions, and the child records versions reference.
//!
//! Lookups only ever return active records. Deactivation is the only form of
//! deletion. Every method that writes more than one row is atomic.
//!
//! All backends (InMemoryStore, SqliteStore) implement this trait, so the
//! service layer can swap them without changing behavior.

use ocl_core::{
    ConceptId, ConceptVersion, Mapping, MappingId, OwnerRef, Source, SourceId, SourceVersion,
    VersionId,
};

use crate::error::StorageError;
use crate::query::ChildFilter;

/// The storage contract for source dictionaries.
///
/// The trait is synchronous; callers serialize access behind a mutex.
pub trait DictionaryStore: Send {
    // -------------------------------------------------------------------
    // Sources
    // -------------------------------------------------------------------

    /// Persists a new source together with its first version.
    ///
    /// Ids in the arguments are ignored; the returned values carry the
    /// assigned ids and the version is linked to the new source. Fails with
    /// [`StorageError::DuplicateSource`] if an active source with the same
    /// owner and mnemonic exists.
    fn create_source(
        &mut self,
        source: &Source,
        initial_version: &SourceVersion,
    ) -> Result<(Source, SourceVersion), StorageError>;

    /// Finds an active source by owner and mnemonic.
    fn get_source(&self, owner: &OwnerRef, mnemonic: &str)
        -> Result<Option<Source>, StorageError>;

    /// Overwrites the mutable attributes of an existing source.
    fn update_source(&mut self, source: &Source) -> Result<(), StorageError>;

    /// Marks a source inactive.
    fn deactivate_source(&mut self, id: SourceId) -> Result<(), StorageError>;

    /// Lists active sources in creation order, optionally restricted to one
    /// owner.
    fn list_sources(&self, owner: Option<&OwnerRef>) -> Result<Vec<Source>, StorageError>;

    // -------------------------------------------------------------------
    // Versions
    // -------------------------------------------------------------------

    /// Persists a new version of `version.source`.
    ///
    /// If the version is released, every other version of the same source is
    /// unreleased in the same write.
    fn create_version(&mut self, version: &SourceVersion) -> Result<SourceVersion, StorageError>;

    /// Finds an active version of a source by mnemonic.
    fn get_version(
        &self,
        source: SourceId,
        mnemonic: &str,
    ) -> Result<Option<SourceVersion>, StorageError>;

    /// Overwrites the mutable attributes of an existing version, with the same
    /// release exclusivity as [`DictionaryStore::create_version`].
    fn update_version(&mut self, version: &SourceVersion) -> Result<(), StorageError>;

    /// Marks a version inactive.
    fn deactivate_version(&mut self, id: VersionId) -> Result<(), StorageError>;

    /// Lists active versions of a source, newest first.
    fn list_versions(&self, source: SourceId) -> Result<Vec<SourceVersion>, StorageError>;

    /// Returns the active released version of a source, if any.
    fn find_released_version(
        &self,
        source: SourceId,
    ) -> Result<Option<SourceVersion>, StorageError>;

    /// Lists active versions of a source whose `parent_version` is `parent`,
    /// newest first.
    fn find_child_versions(
        &self,
        source: SourceId,
        parent: &str,
    ) -> Result<Vec<SourceVersion>, StorageError>;

    // -------------------------------------------------------------------
    // Concepts and mappings
    // -------------------------------------------------------------------

    /// Persists a concept version, returning it with its assigned id.
    fn create_concept(&mut self, concept: &ConceptVersion) -> Result<ConceptVersion, StorageError>;

    /// Persists a mapping, returning it with its assigned id.
    fn create_mapping(&mut self, mapping: &Mapping) -> Result<Mapping, StorageError>;

    /// Fetches concepts selected by `filter`.
    fn find_concepts(
        &self,
        filter: &ChildFilter<ConceptId>,
    ) -> Result<Vec<ConceptVersion>, StorageError>;

    /// Fetches mappings selected by `filter`.
    fn find_mappings(&self, filter: &ChildFilter<MappingId>) -> Result<Vec<Mapping>, StorageError>;

    // -------------------------------------------------------------------
    // Organization membership
    // -------------------------------------------------------------------

    /// Records `user` as a member of `org`. Idempotent.
    fn add_org_member(&mut self, org: &str, user: &str) -> Result<(), StorageError>;

    /// Whether `user` is a member of `org`.
    fn is_org_member(&self, org: &str, user: &str) -> Result<bool, StorageError>;
}
