//! Behavioral contract shared by every [`DictionaryStore`] backend.
//!
//! Each check is a generic function run once against [`InMemoryStore`] and
//! once against an in-memory [`SqliteStore`], so the two backends cannot
//! drift apart.

use ocl_core::{ConceptVersion, Mapping, OwnerRef, Source, SourceVersion};
use ocl_storage::{ChildFilter, DictionaryStore, InMemoryStore, SqliteStore, StorageError};

fn backends() -> Vec<(&'static str, Box<dyn DictionaryStore>)> {
    vec![
        ("memory", Box::new(InMemoryStore::new())),
        ("sqlite", Box::new(SqliteStore::in_memory().unwrap())),
    ]
}

fn new_source(store: &mut dyn DictionaryStore, owner: &OwnerRef, mnemonic: &str) -> Source {
    let source = Source::new(owner, mnemonic, format!("{mnemonic} name"));
    let (source, _) = store
        .create_source(&source, &SourceVersion::initial_for(&source))
        .unwrap();
    source
}

#[test]
fn create_source_links_released_initial_version() {
    for (name, mut store) in backends() {
        let source = new_source(store.as_mut(), &OwnerRef::user("alice"), "S1");
        let released = store.find_released_version(source.id).unwrap().unwrap();
        assert_eq!(released.mnemonic, "INITIAL", "{name}");
        assert_eq!(released.source, source.id, "{name}");
    }
}

#[test]
fn duplicate_source_is_rejected_until_deactivated() {
    for (name, mut store) in backends() {
        let owner = OwnerRef::org("WHO");
        let first = new_source(store.as_mut(), &owner, "ICD");
        let dup = Source::new(&owner, "ICD", "dup");
        let err = store
            .create_source(&dup, &SourceVersion::initial_for(&dup))
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateSource { .. }), "{name}");

        store.deactivate_source(first.id).unwrap();
        assert!(store.get_source(&owner, "ICD").unwrap().is_none(), "{name}");
        assert!(store
            .create_source(&dup, &SourceVersion::initial_for(&dup))
            .is_ok());
    }
}

#[test]
fn list_sources_filters_by_owner() {
    for (name, mut store) in backends() {
        new_source(store.as_mut(), &OwnerRef::user("alice"), "A");
        new_source(store.as_mut(), &OwnerRef::org("alice"), "B");
        new_source(store.as_mut(), &OwnerRef::user("bob"), "C");

        assert_eq!(store.list_sources(None).unwrap().len(), 3, "{name}");
        let alice: Vec<_> = store
            .list_sources(Some(&OwnerRef::user("alice")))
            .unwrap()
            .into_iter()
            .map(|s| s.mnemonic)
            .collect();
        assert_eq!(alice, vec!["A"], "{name}");
    }
}

#[test]
fn update_source_persists_changes() {
    for (name, mut store) in backends() {
        let owner = OwnerRef::user("alice");
        let mut source = new_source(store.as_mut(), &owner, "S1");
        source.name = "Renamed".into();
        source.supported_locales = vec!["en".into()];
        store.update_source(&source).unwrap();

        let loaded = store.get_source(&owner, "S1").unwrap().unwrap();
        assert_eq!(loaded.name, "Renamed", "{name}");
        assert_eq!(loaded.supported_locales, vec!["en"], "{name}");
    }
}

#[test]
fn releasing_a_version_unreleases_siblings() {
    for (name, mut store) in backends() {
        let source = new_source(store.as_mut(), &OwnerRef::user("alice"), "S1");

        let mut v2 = SourceVersion::new(source.id, "v2");
        v2.released = true;
        let v2 = store.create_version(&v2).unwrap();
        let latest = store.find_released_version(source.id).unwrap().unwrap();
        assert_eq!(latest.id, v2.id, "{name}");
        let initial = store.get_version(source.id, "INITIAL").unwrap().unwrap();
        assert!(!initial.released, "{name}");

        let mut initial = initial;
        initial.released = true;
        store.update_version(&initial).unwrap();
        let latest = store.find_released_version(source.id).unwrap().unwrap();
        assert_eq!(latest.mnemonic, "INITIAL", "{name}");
        assert!(!store.get_version(source.id, "v2").unwrap().unwrap().released);
    }
}

#[test]
fn duplicate_version_mnemonic_rejected() {
    for (name, mut store) in backends() {
        let source = new_source(store.as_mut(), &OwnerRef::user("alice"), "S1");
        let err = store
            .create_version(&SourceVersion::new(source.id, "INITIAL"))
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateVersion { .. }), "{name}");
    }
}

#[test]
fn versions_listed_newest_first_and_children_by_parent() {
    for (name, mut store) in backends() {
        let source = new_source(store.as_mut(), &OwnerRef::user("alice"), "S1");
        let mut child = SourceVersion::new(source.id, "child");
        child.parent_version = Some("INITIAL".into());
        store.create_version(&child).unwrap();
        store
            .create_version(&SourceVersion::new(source.id, "orphan"))
            .unwrap();

        let order: Vec<_> = store
            .list_versions(source.id)
            .unwrap()
            .into_iter()
            .map(|v| v.mnemonic)
            .collect();
        assert_eq!(order, vec!["orphan", "child", "INITIAL"], "{name}");

        let children = store.find_child_versions(source.id, "INITIAL").unwrap();
        assert_eq!(children.len(), 1, "{name}");
        assert_eq!(children[0].mnemonic, "child", "{name}");
    }
}

#[test]
fn version_membership_roundtrips() {
    for (name, mut store) in backends() {
        let source = new_source(store.as_mut(), &OwnerRef::user("alice"), "S1");
        let concept = store
            .create_concept(&ConceptVersion::new("C1", "Concept one"))
            .unwrap();
        let mapping = store
            .create_mapping(&Mapping::new("SAME-AS", "C1", "C2"))
            .unwrap();

        let mut version = store.get_version(source.id, "INITIAL").unwrap().unwrap();
        version.concepts.push(concept.id);
        version.mappings.push(mapping.id);
        store.update_version(&version).unwrap();

        let loaded = store.get_version(source.id, "INITIAL").unwrap().unwrap();
        assert_eq!(loaded.concepts, vec![concept.id], "{name}");
        assert_eq!(loaded.mappings, vec![mapping.id], "{name}");
    }
}

#[test]
fn child_filter_excludes_retired_inactive_and_applies_limit() {
    for (name, mut store) in backends() {
        let active = store.create_concept(&ConceptVersion::new("A", "a")).unwrap();
        let mut retired = ConceptVersion::new("R", "r");
        retired.retired = true;
        let retired = store.create_concept(&retired).unwrap();
        let mut inactive = ConceptVersion::new("I", "i");
        inactive.is_active = false;
        let inactive = store.create_concept(&inactive).unwrap();
        let outsider = store.create_concept(&ConceptVersion::new("O", "o")).unwrap();

        let ids = vec![active.id, retired.id, inactive.id];
        let found = store.find_concepts(&ChildFilter::new(ids.clone())).unwrap();
        assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), vec![active.id], "{name}");

        let with_retired = store
            .find_concepts(&ChildFilter::new(ids.clone()).include_retired(true))
            .unwrap();
        assert_eq!(
            with_retired.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![active.id, retired.id],
            "{name}"
        );
        assert!(!with_retired.iter().any(|c| c.id == outsider.id));

        let limited = store
            .find_concepts(&ChildFilter::new(ids).include_retired(true).limit(1))
            .unwrap();
        assert_eq!(limited.len(), 1, "{name}");
    }
}

#[test]
fn mapping_filter_matches_concept_semantics() {
    for (name, mut store) in backends() {
        let kept = store.create_mapping(&Mapping::new("SAME-AS", "A", "B")).unwrap();
        let mut retired = Mapping::new("NARROWER-THAN", "A", "C");
        retired.retired = true;
        let retired = store.create_mapping(&retired).unwrap();

        let found = store
            .find_mappings(&ChildFilter::new(vec![kept.id, retired.id]))
            .unwrap();
        assert_eq!(found.len(), 1, "{name}");
        assert_eq!(found[0].map_type, "SAME-AS", "{name}");
    }
}

#[test]
fn org_membership_is_idempotent() {
    for (name, mut store) in backends() {
        assert!(!store.is_org_member("WHO", "alice").unwrap(), "{name}");
        store.add_org_member("WHO", "alice").unwrap();
        store.add_org_member("WHO", "alice").unwrap();
        assert!(store.is_org_member("WHO", "alice").unwrap(), "{name}");
        assert!(!store.is_org_member("WHO", "bob").unwrap(), "{name}");
    }
}
