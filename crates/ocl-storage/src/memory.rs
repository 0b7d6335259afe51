//! In-memory implementation of [`DictionaryStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and ephemeral
//! servers. It keeps every record in ordered maps keyed by id and follows
//! the same semantics as the SQLite backend: deactivated rows stay stored but
//! are invisible to lookups, and ids are never reused.

use std::collections::{BTreeMap, HashSet};

use ocl_core::{
    ConceptId, ConceptVersion, Mapping, MappingId, OwnerRef, Source, SourceId, SourceVersion,
    VersionId,
};

use crate::error::StorageError;
use crate::query::ChildFilter;
use crate::traits::DictionaryStore;

/// HashMap/BTreeMap-backed storage.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    sources: BTreeMap<SourceId, Source>,
    versions: BTreeMap<VersionId, SourceVersion>,
    concepts: BTreeMap<ConceptId, ConceptVersion>,
    mappings: BTreeMap<MappingId, Mapping>,
    org_members: HashSet<(String, String)>,
    next_source_id: i64,
    next_version_id: i64,
    next_concept_id: i64,
    next_mapping_id: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn active_source_exists(&self, owner: &OwnerRef, mnemonic: &str, except: SourceId) -> bool {
        self.sources.values().any(|s| {
            s.is_active
                && s.id != except
                && s.owner_type == owner.owner_type
                && s.owner == owner.name
                && s.mnemonic == mnemonic
        })
    }

    fn active_version_exists(&self, source: SourceId, mnemonic: &str, except: VersionId) -> bool {
        self.versions
            .values()
            .any(|v| v.is_active && v.id != except && v.source == source && v.mnemonic == mnemonic)
    }

    fn unrelease_siblings(&mut self, source: SourceId, keep: VersionId) {
        for version in self.versions.values_mut() {
            if version.source == source && version.id != keep {
                version.released = false;
            }
        }
    }

    fn insert_version(&mut self, version: &SourceVersion) -> SourceVersion {
        let mut stored = version.clone();
        stored.id = VersionId(Self::allocate(&mut self.next_version_id));
        if stored.released && stored.is_active {
            self.unrelease_siblings(stored.source, stored.id);
        }
        self.versions.insert(stored.id, stored.clone());
        stored
    }

    fn newest_first(&self, pred: impl Fn(&SourceVersion) -> bool) -> Vec<SourceVersion> {
        self.versions
            .values()
            .rev()
            .filter(|v| v.is_active && pred(v))
            .cloned()
            .collect()
    }
}

/// Applies a [`ChildFilter`] to an id-ordered map.
fn select<I: Ord + Copy, T: Clone>(
    rows: &BTreeMap<I, T>,
    filter: &ChildFilter<I>,
    flags: impl Fn(&T) -> (bool, bool),
) -> Vec<T> {
    let wanted: std::collections::BTreeSet<I> = filter.ids.iter().copied().collect();
    let matching = wanted
        .iter()
        .filter_map(|id| rows.get(id))
        .filter(|row| {
            let (is_active, retired) = flags(row);
            filter.admits(is_active, retired)
        })
        .cloned();
    match filter.limit {
        Some(limit) => matching.take(limit).collect(),
        None => matching.collect(),
    }
}

impl DictionaryStore for InMemoryStore {
    fn create_source(
        &mut self,
        source: &Source,
        initial_version: &SourceVersion,
    ) -> Result<(Source, SourceVersion), StorageError> {
        let owner = source.owner_ref();
        if self.active_source_exists(&owner, &source.mnemonic, SourceId(0)) {
            return Err(StorageError::DuplicateSource {
                owner: owner.url(),
                mnemonic: source.mnemonic.clone(),
            });
        }

        let mut stored = source.clone();
        stored.id = SourceId(Self::allocate(&mut self.next_source_id));
        self.sources.insert(stored.id, stored.clone());

        let mut version = initial_version.clone();
        version.source = stored.id;
        let version = self.insert_version(&version);
        Ok((stored, version))
    }

    fn get_source(
        &self,
        owner: &OwnerRef,
        mnemonic: &str,
    ) -> Result<Option<Source>, StorageError> {
        Ok(self
            .sources
            .values()
            .find(|s| {
                s.is_active
                    && s.owner_type == owner.owner_type
                    && s.owner == owner.name
                    && s.mnemonic == mnemonic
            })
            .cloned())
    }

    fn update_source(&mut self, source: &Source) -> Result<(), StorageError> {
        if !self.sources.contains_key(&source.id) {
            return Err(StorageError::SourceNotFound(source.id.0));
        }
        if source.is_active
            && self.active_source_exists(&source.owner_ref(), &source.mnemonic, source.id)
        {
            return Err(StorageError::DuplicateSource {
                owner: source.owner_ref().url(),
                mnemonic: source.mnemonic.clone(),
            });
        }
        self.sources.insert(source.id, source.clone());
        Ok(())
    }

    fn deactivate_source(&mut self, id: SourceId) -> Result<(), StorageError> {
        let source = self
            .sources
            .get_mut(&id)
            .ok_or(StorageError::SourceNotFound(id.0))?;
        source.is_active = false;
        source.touch();
        Ok(())
    }

    fn list_sources(&self, owner: Option<&OwnerRef>) -> Result<Vec<Source>, StorageError> {
        Ok(self
            .sources
            .values()
            .filter(|s| s.is_active)
            .filter(|s| owner.map_or(true, |o| s.owner_type == o.owner_type && s.owner == o.name))
            .cloned()
            .collect())
    }

    fn create_version(&mut self, version: &SourceVersion) -> Result<SourceVersion, StorageError> {
        if !self.sources.contains_key(&version.source) {
            return Err(StorageError::SourceNotFound(version.source.0));
        }
        if self.active_version_exists(version.source, &version.mnemonic, VersionId(0)) {
            return Err(StorageError::DuplicateVersion {
                source_id: version.source.0,
                mnemonic: version.mnemonic.clone(),
            });
        }
        Ok(self.insert_version(version))
    }

    fn get_version(
        &self,
        source: SourceId,
        mnemonic: &str,
    ) -> Result<Option<SourceVersion>, StorageError> {
        Ok(self
            .versions
            .values()
            .find(|v| v.is_active && v.source == source && v.mnemonic == mnemonic)
            .cloned())
    }

    fn update_version(&mut self, version: &SourceVersion) -> Result<(), StorageError> {
        if !self.versions.contains_key(&version.id) {
            return Err(StorageError::VersionNotFound(version.id.0));
        }
        if version.is_active
            && self.active_version_exists(version.source, &version.mnemonic, version.id)
        {
            return Err(StorageError::DuplicateVersion {
                source_id: version.source.0,
                mnemonic: version.mnemonic.clone(),
            });
        }
        if version.released && version.is_active {
            self.unrelease_siblings(version.source, version.id);
        }
        self.versions.insert(version.id, version.clone());
        Ok(())
    }

    fn deactivate_version(&mut self, id: VersionId) -> Result<(), StorageError> {
        let version = self
            .versions
            .get_mut(&id)
            .ok_or(StorageError::VersionNotFound(id.0))?;
        version.is_active = false;
        version.touch();
        Ok(())
    }

    fn list_versions(&self, source: SourceId) -> Result<Vec<SourceVersion>, StorageError> {
        Ok(self.newest_first(|v| v.source == source))
    }

    fn find_released_version(
        &self,
        source: SourceId,
    ) -> Result<Option<SourceVersion>, StorageError> {
        Ok(self
            .versions
            .values()
            .rev()
            .find(|v| v.is_active && v.released && v.source == source)
            .cloned())
    }

    fn find_child_versions(
        &self,
        source: SourceId,
        parent: &str,
    ) -> Result<Vec<SourceVersion>, StorageError> {
        Ok(self.newest_first(|v| v.source == source && v.parent_version.as_deref() == Some(parent)))
    }

    fn create_concept(&mut self, concept: &ConceptVersion) -> Result<ConceptVersion, StorageError> {
        let mut stored = concept.clone();
        stored.id = ConceptId(Self::allocate(&mut self.next_concept_id));
        self.concepts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn create_mapping(&mut self, mapping: &Mapping) -> Result<Mapping, StorageError> {
        let mut stored = mapping.clone();
        stored.id = MappingId(Self::allocate(&mut self.next_mapping_id));
        self.mappings.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn find_concepts(
        &self,
        filter: &ChildFilter<ConceptId>,
    ) -> Result<Vec<ConceptVersion>, StorageError> {
        Ok(select(&self.concepts, filter, |c| (c.is_active, c.retired)))
    }

    fn find_mappings(&self, filter: &ChildFilter<MappingId>) -> Result<Vec<Mapping>, StorageError> {
        Ok(select(&self.mappings, filter, |m| (m.is_active, m.retired)))
    }

    fn add_org_member(&mut self, org: &str, user: &str) -> Result<(), StorageError> {
        self.org_members.insert((org.to_string(), user.to_string()));
        Ok(())
    }

    fn is_org_member(&self, org: &str, user: &str) -> Result<bool, StorageError> {
        Ok(self
            .org_members
            .contains(&(org.to_string(), user.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_source() -> (InMemoryStore, Source, SourceVersion) {
        let mut store = InMemoryStore::new();
        let source = Source::new(&OwnerRef::user("alice"), "S1", "Source One");
        let initial = SourceVersion::initial_for(&source);
        let (source, initial) = store.create_source(&source, &initial).unwrap();
        (store, source, initial)
    }

    #[test]
    fn test_ids_are_allocated_and_linked() {
        let (_, source, initial) = store_with_source();
        assert_eq!(source.id, SourceId(1));
        assert_eq!(initial.id, VersionId(1));
        assert_eq!(initial.source, source.id);
    }

    #[test]
    fn test_duplicate_active_source_rejected() {
        let (mut store, source, _) = store_with_source();
        let again = Source::new(&OwnerRef::user("alice"), "S1", "Again");
        let err = store
            .create_source(&again, &SourceVersion::initial_for(&again))
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateSource { .. }));

        store.deactivate_source(source.id).unwrap();
        assert!(store
            .create_source(&again, &SourceVersion::initial_for(&again))
            .is_ok());
    }

    #[test]
    fn test_same_mnemonic_under_other_owner_allowed() {
        let (mut store, _, _) = store_with_source();
        let other = Source::new(&OwnerRef::org("alice"), "S1", "Org source");
        assert!(store
            .create_source(&other, &SourceVersion::initial_for(&other))
            .is_ok());
    }

    #[test]
    fn test_deactivated_version_invisible() {
        let (mut store, source, _) = store_with_source();
        let v2 = store
            .create_version(&SourceVersion::new(source.id, "v2"))
            .unwrap();
        store.deactivate_version(v2.id).unwrap();
        assert!(store.get_version(source.id, "v2").unwrap().is_none());
        assert_eq!(store.list_versions(source.id).unwrap().len(), 1);
    }

    #[test]
    fn test_select_orders_by_id_and_ignores_unknown_ids() {
        let mut store = InMemoryStore::new();
        let a = store.create_concept(&ConceptVersion::new("A", "a")).unwrap();
        let b = store.create_concept(&ConceptVersion::new("B", "b")).unwrap();
        let filter = ChildFilter::new(vec![b.id, ConceptId(99), a.id]);
        let found = store.find_concepts(&filter).unwrap();
        assert_eq!(
            found.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![a.id, b.id]
        );
    }
}
