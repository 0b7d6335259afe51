//! DictionaryService: the single coordinator between HTTP handlers and the
//! storage crate.
//!
//! All business logic flows through [`DictionaryService`]: owner and source
//! resolution, permission checks, validation, release bookkeeping and nested
//! collection expansion. Handlers are thin wrappers that delegate to these
//! methods.
//!
//! Lookups run in a fixed order so the same request always fails the same
//! way: missing parent source (404, or 405 for version writes), missing
//! version (404), permission (403), then payload validation (400).

use std::collections::HashMap;

use ocl_core::{
    ConceptVersion, Extras, FieldErrors, Mapping, OwnerRef, OwnerType, Source, SourceVersion,
    NON_FIELD_ERRORS,
};
use ocl_storage::{ChildFilter, DictionaryStore, InMemoryStore, SqliteStore};

use crate::auth::{Caller, Principal};
use crate::config::IN_MEMORY_DB;
use crate::error::ApiError;
use crate::params::IncludeParams;
use crate::permissions::{self, Access};
use crate::schema::common::DeferredBody;
use crate::schema::sources::{CreateSourceRequest, UpdateSourceRequest};
use crate::schema::versions::{CreateVersionRequest, UpdateVersionRequest};
use crate::search::{SearchQuery, SearchResults};

/// Message returned when deleting the released version of a source.
pub const RELEASED_VERSION_DELETE_MESSAGE: &str = "Cannot deactivate a version that is currently released.  Please release another version before deactivating this one.";

/// How a version is addressed in a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    Named(String),
    /// The source's released version.
    Latest,
}

impl VersionSelector {
    pub fn parse(segment: &str) -> Self {
        if segment == ocl_core::LATEST_VERSION {
            VersionSelector::Latest
        } else {
            VersionSelector::Named(segment.to_string())
        }
    }
}

/// A source with the nested collections a GET asked for.
#[derive(Debug, Clone)]
pub struct SourceExpansion {
    pub source: Source,
    pub concepts: Option<Vec<ConceptVersion>>,
    pub mappings: Option<Vec<Mapping>>,
}

/// The central service coordinating sources, versions and their extras.
pub struct DictionaryService {
    store: Box<dyn DictionaryStore>,
}

impl DictionaryService {
    pub fn new(store: Box<dyn DictionaryStore>) -> Self {
        DictionaryService { store }
    }

    /// Opens the backend named by `db_path`: `:memory:` selects the
    /// in-memory store, anything else a SQLite file.
    pub fn open(db_path: &str) -> Result<Self, ApiError> {
        if db_path == IN_MEMORY_DB {
            return Ok(Self::in_memory());
        }
        let store = SqliteStore::new(db_path)
            .map_err(|e| ApiError::InternalError(format!("failed to open store: {}", e)))?;
        tracing::info!(db_path, "opened SQLite store");
        Ok(Self::new(Box::new(store)))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryStore::new()))
    }

    // -------------------------------------------------------------------
    // Lookups and permission checks
    // -------------------------------------------------------------------

    fn is_member(&self, principal: &Principal, owner: &OwnerRef) -> Result<bool, ApiError> {
        match (principal.username(), owner.owner_type) {
            (Some(user), OwnerType::Organization) => {
                Ok(self.store.is_org_member(&owner.name, user)?)
            }
            _ => Ok(false),
        }
    }

    fn authorize(&self, caller: &Caller, source: &Source) -> Result<(), ApiError> {
        let member = self.is_member(&caller.principal, &source.owner_ref())?;
        if permissions::may_access(&caller.principal, source, caller.access, |_| member) {
            return Ok(());
        }
        tracing::debug!(
            user = caller.principal.username().unwrap_or("anonymous"),
            source = %source.url(),
            access = ?caller.access,
            "permission denied"
        );
        let verb = match caller.access {
            Access::View => "view",
            Access::Edit => "edit",
        };
        Err(ApiError::Forbidden(format!(
            "You do not have permission to {} source '{}'.",
            verb, source.mnemonic
        )))
    }

    fn find_source(&self, owner: &OwnerRef, mnemonic: &str) -> Result<Source, ApiError> {
        self.store.get_source(owner, mnemonic)?.ok_or_else(|| {
            ApiError::NotFound(format!("source '{}' not found under {}", mnemonic, owner.url()))
        })
    }

    /// Resolves a source for a read or write and checks the caller's access.
    fn source_for(
        &self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
    ) -> Result<Source, ApiError> {
        let source = self.find_source(owner, mnemonic)?;
        self.authorize(caller, &source)?;
        Ok(source)
    }

    /// Resolves the parent source of a version write. A missing parent is a
    /// 405 since there is nothing to attach the version to.
    fn parent_for_write(&self, owner: &OwnerRef, mnemonic: &str) -> Result<Source, ApiError> {
        self.store.get_source(owner, mnemonic)?.ok_or_else(|| {
            ApiError::MethodNotAllowed(format!(
                "source '{}' not found under {}",
                mnemonic,
                owner.url()
            ))
        })
    }

    fn resolve_version(
        &self,
        source: &Source,
        selector: &VersionSelector,
    ) -> Result<SourceVersion, ApiError> {
        let found = match selector {
            VersionSelector::Named(mnemonic) => self.store.get_version(source.id, mnemonic)?,
            VersionSelector::Latest => self.store.find_released_version(source.id)?,
        };
        found.ok_or_else(|| match selector {
            VersionSelector::Named(mnemonic) => ApiError::NotFound(format!(
                "version '{}' of source '{}' not found",
                mnemonic, source.mnemonic
            )),
            VersionSelector::Latest => ApiError::NotFound(format!(
                "source '{}' has no released version",
                source.mnemonic
            )),
        })
    }

    /// Looks up a version named by a `previous_version`/`parent_version`
    /// field, recording a field error when it does not exist.
    fn linked_version(
        &self,
        source: &Source,
        field: &str,
        mnemonic: Option<&str>,
        errors: &mut FieldErrors,
    ) -> Result<Option<SourceVersion>, ApiError> {
        let Some(mnemonic) = mnemonic else {
            return Ok(None);
        };
        let found = self.store.get_version(source.id, mnemonic)?;
        if found.is_none() {
            errors.add(
                field,
                format!("Version '{}' does not exist for this source.", mnemonic),
            );
        }
        Ok(found)
    }

    // -------------------------------------------------------------------
    // Sources
    // -------------------------------------------------------------------

    /// Lists the sources `principal` may view, optionally under one owner,
    /// run through the search backend.
    pub fn search_sources(
        &self,
        principal: &Principal,
        owner: Option<&OwnerRef>,
        query: &SearchQuery,
    ) -> Result<SearchResults<Source>, ApiError> {
        let mut membership: HashMap<String, bool> = HashMap::new();
        let mut visible = Vec::new();
        for source in self.store.list_sources(owner)? {
            let member = match source.owner_type {
                OwnerType::User => false,
                OwnerType::Organization => match membership.get(&source.owner) {
                    Some(known) => *known,
                    None => {
                        let member = self.is_member(principal, &source.owner_ref())?;
                        membership.insert(source.owner.clone(), member);
                        member
                    }
                },
            };
            if permissions::may_access(principal, &source, Access::View, |_| member) {
                visible.push(source);
            }
        }
        Ok(query.apply(visible))
    }

    /// Creates a source under `owner` together with its released `INITIAL`
    /// version.
    pub fn create_source(
        &mut self,
        principal: &Principal,
        owner: &OwnerRef,
        request: CreateSourceRequest,
    ) -> Result<Source, ApiError> {
        let member = self.is_member(principal, owner)?;
        if !permissions::may_create_under(principal, owner, |_| member) {
            return Err(ApiError::Forbidden(format!(
                "You do not have permission to create sources under {}.",
                owner.url()
            )));
        }

        let source = request.into_source(owner)?;
        if self.store.get_source(owner, &source.mnemonic)?.is_some() {
            return Err(FieldErrors::single(
                "id",
                format!(
                    "Source with mnemonic '{}' already exists for this owner.",
                    source.mnemonic
                ),
            )
            .into());
        }

        let initial = SourceVersion::initial_for(&source);
        let (source, version) = self.store.create_source(&source, &initial)?;
        tracing::info!(source = %source.url(), version = %version.mnemonic, "created source");
        Ok(source)
    }

    /// Fetches a source, expanding the concept and mapping collections of
    /// its released version when `include` asks for them.
    pub fn retrieve_source(
        &self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
        include: IncludeParams,
    ) -> Result<SourceExpansion, ApiError> {
        let source = self.source_for(caller, owner, mnemonic)?;
        let mut expansion = SourceExpansion {
            source,
            concepts: None,
            mappings: None,
        };
        if !include.any() {
            return Ok(expansion);
        }

        let latest = self.store.find_released_version(expansion.source.id)?;
        if include.concepts {
            let ids = latest
                .as_ref()
                .map(|v| v.concepts.clone())
                .unwrap_or_default();
            let filter = ChildFilter::new(ids)
                .include_retired(include.retired)
                .limit(include.limit);
            expansion.concepts = Some(self.store.find_concepts(&filter)?);
        }
        if include.mappings {
            let ids = latest
                .as_ref()
                .map(|v| v.mappings.clone())
                .unwrap_or_default();
            let filter = ChildFilter::new(ids)
                .include_retired(include.retired)
                .limit(include.limit);
            expansion.mappings = Some(self.store.find_mappings(&filter)?);
        }
        Ok(expansion)
    }

    pub fn update_source(
        &mut self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
        body: &DeferredBody,
    ) -> Result<Source, ApiError> {
        let mut source = self.source_for(caller, owner, mnemonic)?;
        let request: UpdateSourceRequest = body.decode()?;
        request.apply(&mut source)?;
        self.store.update_source(&source)?;
        tracing::info!(source = %source.url(), "updated source");
        Ok(source)
    }

    /// Deactivates a source.
    pub fn delete_source(
        &mut self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
    ) -> Result<(), ApiError> {
        let source = self.source_for(caller, owner, mnemonic)?;
        self.store.deactivate_source(source.id)?;
        tracing::info!(source = %source.url(), "deactivated source");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Extras
    // -------------------------------------------------------------------

    pub fn get_extras(
        &self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
    ) -> Result<Extras, ApiError> {
        Ok(self.source_for(caller, owner, mnemonic)?.extras)
    }

    pub fn get_extra(
        &self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
        key: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let source = self.source_for(caller, owner, mnemonic)?;
        source
            .extras
            .get(key)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("extra '{}' not found", key)))
    }

    /// Sets one extra from a `{key: value}` body and returns the stored value.
    pub fn put_extra(
        &mut self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
        key: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let mut source = self.source_for(caller, owner, mnemonic)?;
        let value = match body {
            serde_json::Value::Object(mut map) => map.remove(key),
            _ => None,
        }
        .ok_or_else(|| {
            ApiError::BadRequest(format!("request body must contain the key '{}'", key))
        })?;
        source.extras.insert(key.to_string(), value.clone());
        source.touch();
        self.store.update_source(&source)?;
        tracing::info!(source = %source.url(), key, "set extra");
        Ok(value)
    }

    pub fn delete_extra(
        &mut self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
        key: &str,
    ) -> Result<(), ApiError> {
        let mut source = self.source_for(caller, owner, mnemonic)?;
        if source.extras.remove(key).is_none() {
            return Err(ApiError::NotFound(format!("extra '{}' not found", key)));
        }
        source.touch();
        self.store.update_source(&source)?;
        tracing::info!(source = %source.url(), key, "deleted extra");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Versions
    // -------------------------------------------------------------------

    /// Lists the active versions of a source, newest first.
    pub fn list_versions(
        &self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
    ) -> Result<(Source, Vec<SourceVersion>), ApiError> {
        let source = self.source_for(caller, owner, mnemonic)?;
        let versions = self.store.list_versions(source.id)?;
        Ok((source, versions))
    }

    /// Creates a version of a source. The new version copies the membership
    /// of its `previous_version`, and becomes the latest when released.
    ///
    /// The body is decoded only after the parent source and permission
    /// checks pass.
    pub fn create_version(
        &mut self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
        body: &DeferredBody,
    ) -> Result<(Source, SourceVersion), ApiError> {
        let source = self.parent_for_write(owner, mnemonic)?;
        self.authorize(caller, &source)?;
        let request: CreateVersionRequest = body.decode()?;

        let mut errors = FieldErrors::new();
        request.check(&mut errors);
        if let Some(id) = request.id.as_deref() {
            if errors.get("id").is_none() && self.store.get_version(source.id, id)?.is_some() {
                errors.add(
                    "id",
                    format!("Version with mnemonic '{}' already exists for this source.", id),
                );
            }
        }
        let previous = self.linked_version(
            &source,
            "previous_version",
            request.previous_version.as_deref(),
            &mut errors,
        )?;
        self.linked_version(
            &source,
            "parent_version",
            request.parent_version.as_deref(),
            &mut errors,
        )?;
        errors.into_result()?;

        let mut version = request.into_version(source.id);
        if let Some(previous) = &previous {
            version.inherit_membership(previous);
        }
        let version = self.store.create_version(&version)?;
        tracing::info!(
            version = %version.url(&source),
            released = version.released,
            "created version"
        );
        Ok((source, version))
    }

    pub fn get_version(
        &self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
        selector: &VersionSelector,
    ) -> Result<(Source, SourceVersion), ApiError> {
        let source = self.find_source(owner, mnemonic)?;
        let version = self.resolve_version(&source, selector)?;
        self.authorize(caller, &source)?;
        Ok((source, version))
    }

    /// Applies a partial update to a version. Releasing it unreleases every
    /// sibling.
    pub fn update_version(
        &mut self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
        selector: &VersionSelector,
        body: &DeferredBody,
    ) -> Result<(Source, SourceVersion), ApiError> {
        let source = self.parent_for_write(owner, mnemonic)?;
        let mut version = self.resolve_version(&source, selector)?;
        self.authorize(caller, &source)?;
        let request: UpdateVersionRequest = body.decode()?;
        request.apply(&mut version);
        self.store.update_version(&version)?;
        tracing::info!(
            version = %version.url(&source),
            released = version.released,
            "updated version"
        );
        Ok((source, version))
    }

    /// Deactivates a version. The released version is refused.
    pub fn delete_version(
        &mut self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
        selector: &VersionSelector,
    ) -> Result<(), ApiError> {
        let source = self.find_source(owner, mnemonic)?;
        let version = self.resolve_version(&source, selector)?;
        self.authorize(caller, &source)?;
        if version.released {
            return Err(FieldErrors::single(NON_FIELD_ERRORS, RELEASED_VERSION_DELETE_MESSAGE).into());
        }
        self.store.deactivate_version(version.id)?;
        tracing::info!(version = %version.url(&source), "deactivated version");
        Ok(())
    }

    /// Lists the active versions whose parent is the selected version.
    pub fn list_child_versions(
        &self,
        caller: &Caller,
        owner: &OwnerRef,
        mnemonic: &str,
        selector: &VersionSelector,
    ) -> Result<(Source, Vec<SourceVersion>), ApiError> {
        let (source, parent) = self.get_version(caller, owner, mnemonic, selector)?;
        let children = self.store.find_child_versions(source.id, &parent.mnemonic)?;
        Ok((source, children))
    }

    // -------------------------------------------------------------------
    // Membership seeding
    // -------------------------------------------------------------------

    /// Stores a concept and adds it to a version's membership.
    pub fn add_concept(
        &mut self,
        owner: &OwnerRef,
        mnemonic: &str,
        version: &str,
        concept: &ConceptVersion,
    ) -> Result<ConceptVersion, ApiError> {
        let source = self.find_source(owner, mnemonic)?;
        let mut target = self.resolve_version(&source, &VersionSelector::parse(version))?;
        let concept = self.store.create_concept(concept)?;
        target.concepts.push(concept.id);
        target.touch();
        self.store.update_version(&target)?;
        Ok(concept)
    }

    /// Stores a mapping and adds it to a version's membership.
    pub fn add_mapping(
        &mut self,
        owner: &OwnerRef,
        mnemonic: &str,
        version: &str,
        mapping: &Mapping,
    ) -> Result<Mapping, ApiError> {
        let source = self.find_source(owner, mnemonic)?;
        let mut target = self.resolve_version(&source, &VersionSelector::parse(version))?;
        let mapping = self.store.create_mapping(mapping)?;
        target.mappings.push(mapping.id);
        target.touch();
        self.store.update_version(&target)?;
        Ok(mapping)
    }

    pub fn add_org_member(&mut self, org: &str, user: &str) -> Result<(), ApiError> {
        self.store.add_org_member(org, user)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocl_core::{AccessLevel, INITIAL_VERSION};

    fn owner() -> OwnerRef {
        OwnerRef::user("alice")
    }

    fn alice(access: Access) -> Caller {
        Caller::new(Principal::user("alice"), access)
    }

    fn service_with_source() -> DictionaryService {
        let mut service = DictionaryService::in_memory();
        let request: CreateSourceRequest =
            serde_json::from_value(serde_json::json!({ "id": "S1", "name": "Source One" }))
                .unwrap();
        service
            .create_source(&Principal::user("alice"), &owner(), request)
            .unwrap();
        service
    }

    fn create_version(service: &mut DictionaryService, body: serde_json::Value) -> SourceVersion {
        service
            .create_version(&alice(Access::Edit), &owner(), "S1", &body.into())
            .unwrap()
            .1
    }

    #[test]
    fn create_source_makes_initial_release() {
        let service = service_with_source();
        let (_, latest) = service
            .get_version(&alice(Access::View), &owner(), "S1", &VersionSelector::Latest)
            .unwrap();
        assert_eq!(latest.mnemonic, INITIAL_VERSION);
        assert!(latest.released);
    }

    #[test]
    fn create_source_requires_ownership() {
        let mut service = DictionaryService::in_memory();
        let request: CreateSourceRequest =
            serde_json::from_value(serde_json::json!({ "id": "S1", "name": "S" })).unwrap();
        let err = service
            .create_source(&Principal::user("bob"), &owner(), request)
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn org_members_may_create() {
        let mut service = DictionaryService::in_memory();
        service.add_org_member("WHO", "bob").unwrap();
        let request: CreateSourceRequest =
            serde_json::from_value(serde_json::json!({ "id": "ICD", "name": "ICD" })).unwrap();
        let source = service
            .create_source(&Principal::user("bob"), &OwnerRef::org("WHO"), request)
            .unwrap();
        assert_eq!(source.owner_type, OwnerType::Organization);
    }

    #[test]
    fn duplicate_source_is_a_field_error() {
        let mut service = service_with_source();
        let request: CreateSourceRequest =
            serde_json::from_value(serde_json::json!({ "id": "S1", "name": "Again" })).unwrap();
        match service.create_source(&Principal::user("alice"), &owner(), request) {
            Err(ApiError::Validation(errors)) => assert!(errors.get("id").is_some()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn version_write_on_missing_source_is_405() {
        let mut service = DictionaryService::in_memory();
        let body = DeferredBody::from(serde_json::json!({ "id": "v1" }));
        let err = service
            .create_version(&alice(Access::Edit), &owner(), "nope", &body)
            .unwrap_err();
        assert!(matches!(err, ApiError::MethodNotAllowed(_)));
    }

    #[test]
    fn missing_parent_outranks_undecodable_body() {
        let mut service = DictionaryService::in_memory();
        let body = DeferredBody::from(serde_json::json!({ "id": "v1", "released": "yes" }));
        let err = service
            .create_version(&alice(Access::Edit), &owner(), "nope", &body)
            .unwrap_err();
        assert!(matches!(err, ApiError::MethodNotAllowed(_)));
        let err = service
            .update_version(
                &alice(Access::Edit),
                &owner(),
                "nope",
                &VersionSelector::Named("v1".into()),
                &body,
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::MethodNotAllowed(_)));

        let mut service = service_with_source();
        let err = service
            .create_version(&alice(Access::Edit), &owner(), "S1", &body)
            .unwrap_err();
        match err {
            ApiError::Validation(errors) => assert!(errors.get("released").is_some()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn new_version_inherits_previous_membership() {
        let mut service = service_with_source();
        service
            .add_concept(&owner(), "S1", INITIAL_VERSION, &ConceptVersion::new("C1", "One"))
            .unwrap();
        let version = create_version(
            &mut service,
            serde_json::json!({ "id": "v2", "previous_version": INITIAL_VERSION }),
        );
        assert_eq!(version.concepts.len(), 1);
    }

    #[test]
    fn unknown_linked_versions_are_rejected() {
        let mut service = service_with_source();
        let body = DeferredBody::from(serde_json::json!({
            "id": "v2",
            "previous_version": "missing",
            "parent_version": "gone"
        }));
        match service.create_version(&alice(Access::Edit), &owner(), "S1", &body) {
            Err(ApiError::Validation(errors)) => {
                assert!(errors.get("previous_version").is_some());
                assert!(errors.get("parent_version").is_some());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn released_version_cannot_be_deleted() {
        let mut service = service_with_source();
        let err = service
            .delete_version(
                &alice(Access::Edit),
                &owner(),
                "S1",
                &VersionSelector::Named(INITIAL_VERSION.into()),
            )
            .unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(
                    errors.get(NON_FIELD_ERRORS).unwrap(),
                    [RELEASED_VERSION_DELETE_MESSAGE]
                );
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(service
            .get_version(
                &alice(Access::View),
                &owner(),
                "S1",
                &VersionSelector::Named(INITIAL_VERSION.into())
            )
            .is_ok());
    }

    #[test]
    fn releasing_moves_latest() {
        let mut service = service_with_source();
        create_version(&mut service, serde_json::json!({ "id": "v2", "released": true }));
        let (_, latest) = service
            .get_version(&alice(Access::View), &owner(), "S1", &VersionSelector::Latest)
            .unwrap();
        assert_eq!(latest.mnemonic, "v2");

        service
            .delete_version(
                &alice(Access::Edit),
                &owner(),
                "S1",
                &VersionSelector::Named(INITIAL_VERSION.into()),
            )
            .unwrap();
    }

    #[test]
    fn private_source_hidden_from_strangers() {
        let mut service = service_with_source();
        let update = DeferredBody::from(serde_json::json!({ "public_access": "None" }));
        let source = service
            .update_source(&alice(Access::Edit), &owner(), "S1", &update)
            .unwrap();
        assert_eq!(source.public_access, AccessLevel::None);

        let bob = Caller::new(Principal::user("bob"), Access::View);
        let err = service
            .retrieve_source(&bob, &owner(), "S1", IncludeParams::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let query = SearchQuery::default();
        let visible = service.search_sources(&bob.principal, None, &query).unwrap();
        assert!(visible.items.is_empty());
        let visible = service
            .search_sources(&Principal::user("alice"), None, &query)
            .unwrap();
        assert_eq!(visible.items.len(), 1);
    }

    #[test]
    fn retrieve_expands_only_requested_collections() {
        let mut service = service_with_source();
        service
            .add_concept(&owner(), "S1", INITIAL_VERSION, &ConceptVersion::new("C1", "One"))
            .unwrap();
        let mut retired = ConceptVersion::new("C2", "Two");
        retired.retired = true;
        service
            .add_concept(&owner(), "S1", INITIAL_VERSION, &retired)
            .unwrap();

        let include = IncludeParams {
            concepts: true,
            ..IncludeParams::default()
        };
        let expansion = service
            .retrieve_source(&alice(Access::View), &owner(), "S1", include)
            .unwrap();
        assert_eq!(expansion.concepts.unwrap().len(), 1);
        assert!(expansion.mappings.is_none());

        let include = IncludeParams {
            concepts: true,
            retired: true,
            ..IncludeParams::default()
        };
        let expansion = service
            .retrieve_source(&alice(Access::View), &owner(), "S1", include)
            .unwrap();
        assert_eq!(expansion.concepts.unwrap().len(), 2);
    }

    #[test]
    fn extras_roundtrip() {
        let mut service = service_with_source();
        let edit = alice(Access::Edit);
        let value = service
            .put_extra(&edit, &owner(), "S1", "edition", serde_json::json!({ "edition": 3 }))
            .unwrap();
        assert_eq!(value, 3);
        assert!(matches!(
            service.put_extra(&edit, &owner(), "S1", "edition", serde_json::json!({ "x": 1 })),
            Err(ApiError::BadRequest(_))
        ));
        service.delete_extra(&edit, &owner(), "S1", "edition").unwrap();
        assert!(matches!(
            service.get_extra(&alice(Access::View), &owner(), "S1", "edition"),
            Err(ApiError::NotFound(_))
        ));
    }
}
