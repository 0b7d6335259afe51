//! Source version request/response types.

use serde::{Deserialize, Serialize};

use ocl_core::validation::validate_mnemonic;
use ocl_core::{
    is_reserved_version_mnemonic, Extras, FieldErrors, Source, SourceId, SourceVersion,
};

use super::common::timestamp;

/// Compact version representation for listings.
#[derive(Debug, Clone, Serialize)]
pub struct VersionSummaryView {
    pub id: String,
    pub released: bool,
    pub url: String,
}

impl VersionSummaryView {
    pub fn new(version: &SourceVersion, source: &Source) -> Self {
        VersionSummaryView {
            id: version.mnemonic.clone(),
            released: version.released,
            url: version.url(source),
        }
    }
}

/// Full version representation.
#[derive(Debug, Clone, Serialize)]
pub struct VersionDetailView {
    pub id: String,
    pub description: Option<String>,
    pub released: bool,
    pub previous_version: Option<String>,
    pub parent_version: Option<String>,
    pub external_id: Option<String>,
    pub extras: Extras,
    pub url: String,
    pub source_url: String,
    pub concept_count: usize,
    pub mapping_count: usize,
    pub created_on: String,
    pub updated_on: String,
}

impl VersionDetailView {
    pub fn new(version: &SourceVersion, source: &Source) -> Self {
        VersionDetailView {
            id: version.mnemonic.clone(),
            description: version.description.clone(),
            released: version.released,
            previous_version: version.previous_version.clone(),
            parent_version: version.parent_version.clone(),
            external_id: version.external_id.clone(),
            extras: version.extras.clone(),
            url: version.url(source),
            source_url: source.url(),
            concept_count: version.concepts.len(),
            mapping_count: version.mappings.len(),
            created_on: timestamp(&version.created_at),
            updated_on: timestamp(&version.updated_at),
        }
    }
}

/// Either version representation, chosen by the `verbose` flag.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum VersionView {
    Summary(VersionSummaryView),
    Detail(Box<VersionDetailView>),
}

impl VersionView {
    pub fn render(version: &SourceVersion, source: &Source, verbose: bool) -> Self {
        if verbose {
            VersionView::Detail(Box::new(VersionDetailView::new(version, source)))
        } else {
            VersionView::Summary(VersionSummaryView::new(version, source))
        }
    }
}

/// Request body for `POST .../versions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateVersionRequest {
    /// The version mnemonic.
    pub id: Option<String>,
    pub description: Option<String>,
    pub released: Option<bool>,
    pub previous_version: Option<String>,
    pub parent_version: Option<String>,
    pub external_id: Option<String>,
    pub extras: Option<Extras>,
}

impl CreateVersionRequest {
    /// Records problems that can be found without consulting storage.
    pub fn check(&self, errors: &mut FieldErrors) {
        validate_mnemonic("id", self.id.as_deref(), errors);
        if let Some(id) = self.id.as_deref() {
            if is_reserved_version_mnemonic(id) {
                errors.add(
                    "id",
                    format!("'{}' is reserved and cannot be used as a version id.", id),
                );
            }
        }
    }

    /// Builds an unsaved version of `source`. Call after [`Self::check`]
    /// passes.
    pub fn into_version(self, source: SourceId) -> SourceVersion {
        let mut version = SourceVersion::new(source, self.id.unwrap_or_default());
        version.description = self.description;
        version.released = self.released.unwrap_or(false);
        version.previous_version = self.previous_version;
        version.parent_version = self.parent_version;
        version.external_id = self.external_id;
        version.extras = self.extras.unwrap_or_default();
        version
    }
}

/// Request body for `PUT`/`PATCH` on a version. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateVersionRequest {
    pub description: Option<String>,
    pub released: Option<bool>,
    pub external_id: Option<String>,
    pub extras: Option<Extras>,
}

impl UpdateVersionRequest {
    pub fn apply(self, version: &mut SourceVersion) {
        if let Some(description) = self.description {
            version.description = Some(description);
        }
        if let Some(released) = self.released {
            version.released = released;
        }
        if let Some(external_id) = self.external_id {
            version.external_id = Some(external_id);
        }
        if let Some(extras) = self.extras {
            version.extras = extras;
        }
        version.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocl_core::OwnerRef;

    #[test]
    fn create_checks_mnemonic() {
        let req: CreateVersionRequest =
            serde_json::from_value(serde_json::json!({ "id": "bad id" })).unwrap();
        let mut errors = FieldErrors::new();
        req.check(&mut errors);
        assert!(errors.get("id").is_some());
    }

    #[test]
    fn create_rejects_reserved_names() {
        for name in ["latest", "versions", "extras"] {
            let req: CreateVersionRequest =
                serde_json::from_value(serde_json::json!({ "id": name })).unwrap();
            let mut errors = FieldErrors::new();
            req.check(&mut errors);
            assert!(errors.get("id").is_some(), "{name} accepted");
        }
    }

    #[test]
    fn create_defaults_to_unreleased() {
        let req: CreateVersionRequest = serde_json::from_value(serde_json::json!({
            "id": "v1",
            "previous_version": "INITIAL"
        }))
        .unwrap();
        let version = req.into_version(SourceId(3));
        assert!(!version.released);
        assert_eq!(version.source, SourceId(3));
        assert_eq!(version.previous_version.as_deref(), Some("INITIAL"));
    }

    #[test]
    fn update_is_partial() {
        let mut version = SourceVersion::new(SourceId(1), "v1");
        version.description = Some("keep".into());
        let req: UpdateVersionRequest =
            serde_json::from_value(serde_json::json!({ "released": true })).unwrap();
        req.apply(&mut version);
        assert!(version.released);
        assert_eq!(version.description.as_deref(), Some("keep"));
    }

    #[test]
    fn verbose_selects_detail_view() {
        let source = Source::new(&OwnerRef::user("alice"), "S", "S");
        let version = SourceVersion::new(source.id, "v1");
        let summary = serde_json::to_value(VersionView::render(&version, &source, false)).unwrap();
        let detail = serde_json::to_value(VersionView::render(&version, &source, true)).unwrap();
        assert!(summary.get("description").is_none());
        assert_eq!(detail["source_url"], "/users/alice/sources/S/");
        assert_eq!(summary["url"], detail["url"]);
    }
}
