//! Source request/response types.
//!
//! Lists render [`SourceSummaryView`] unless `verbose` is set, in which case
//! they render [`SourceDetailView`]. A single-source GET renders
//! [`SourceRetrieveResponse`], which adds the nested concept and mapping
//! collections only when they were requested.

use serde::{Deserialize, Serialize};

use ocl_core::validation::{require_text, validate_mnemonic};
use ocl_core::{AccessLevel, Extras, FieldErrors, OwnerRef, OwnerType, Source};

use super::children::{ConceptDetailView, MappingDetailView};
use super::common::{parse_choice, timestamp, LocaleList};

/// Compact source representation for listings.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummaryView {
    pub id: String,
    pub name: String,
    pub url: String,
    pub owner: String,
    pub owner_type: OwnerType,
    pub owner_url: String,
}

impl From<&Source> for SourceSummaryView {
    fn from(source: &Source) -> Self {
        SourceSummaryView {
            id: source.mnemonic.clone(),
            name: source.name.clone(),
            url: source.url(),
            owner: source.owner.clone(),
            owner_type: source.owner_type,
            owner_url: source.owner_ref().url(),
        }
    }
}

/// Full source representation.
#[derive(Debug, Clone, Serialize)]
pub struct SourceDetailView {
    pub id: String,
    pub name: String,
    pub full_name: Option<String>,
    pub source_type: Option<String>,
    pub public_access: AccessLevel,
    pub default_locale: Option<String>,
    pub supported_locales: Vec<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub external_id: Option<String>,
    pub extras: Extras,
    pub owner: String,
    pub owner_type: OwnerType,
    pub owner_url: String,
    pub url: String,
    pub versions_url: String,
    pub created_on: String,
    pub updated_on: String,
}

impl From<&Source> for SourceDetailView {
    fn from(source: &Source) -> Self {
        let url = source.url();
        SourceDetailView {
            id: source.mnemonic.clone(),
            name: source.name.clone(),
            full_name: source.full_name.clone(),
            source_type: source.source_type.clone(),
            public_access: source.public_access,
            default_locale: source.default_locale.clone(),
            supported_locales: source.supported_locales.clone(),
            website: source.website.clone(),
            description: source.description.clone(),
            external_id: source.external_id.clone(),
            extras: source.extras.clone(),
            owner: source.owner.clone(),
            owner_type: source.owner_type,
            owner_url: source.owner_ref().url(),
            versions_url: format!("{}versions/", url),
            url,
            created_on: timestamp(&source.created_at),
            updated_on: timestamp(&source.updated_at),
        }
    }
}

/// Either source representation, chosen by the `verbose` flag.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SourceView {
    Summary(SourceSummaryView),
    Detail(Box<SourceDetailView>),
}

impl SourceView {
    pub fn render(source: &Source, verbose: bool) -> Self {
        if verbose {
            SourceView::Detail(Box::new(source.into()))
        } else {
            SourceView::Summary(source.into())
        }
    }
}

/// Response for a single-source GET.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRetrieveResponse {
    #[serde(flatten)]
    pub source: SourceDetailView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concepts: Option<Vec<ConceptDetailView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mappings: Option<Vec<MappingDetailView>>,
}

/// Request body for `POST /{ot}/{owner}/sources`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateSourceRequest {
    /// The source mnemonic.
    pub id: Option<String>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub source_type: Option<String>,
    pub public_access: Option<String>,
    pub default_locale: Option<String>,
    pub supported_locales: Option<LocaleList>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub external_id: Option<String>,
    pub extras: Option<Extras>,
}

impl CreateSourceRequest {
    /// Validates the payload and builds an unsaved source owned by `owner`.
    pub fn into_source(self, owner: &OwnerRef) -> Result<Source, FieldErrors> {
        let mut errors = FieldErrors::new();
        validate_mnemonic("id", self.id.as_deref(), &mut errors);
        require_text("name", self.name.as_deref(), &mut errors);
        let public_access =
            parse_choice::<AccessLevel>("public_access", self.public_access.as_deref(), &mut errors);
        errors.into_result()?;

        let mut source = Source::new(
            owner,
            self.id.unwrap_or_default(),
            self.name.unwrap_or_default(),
        );
        source.full_name = self.full_name;
        source.source_type = self.source_type;
        source.public_access = public_access.unwrap_or_default();
        source.default_locale = self.default_locale;
        source.supported_locales = self
            .supported_locales
            .map(LocaleList::into_vec)
            .unwrap_or_default();
        source.website = self.website;
        source.description = self.description;
        source.external_id = self.external_id;
        source.extras = self.extras.unwrap_or_default();
        Ok(source)
    }
}

/// Request body for `PUT /{ot}/{owner}/sources/{source}`.
///
/// Every field is optional; absent fields keep their stored value. The
/// mnemonic cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSourceRequest {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub source_type: Option<String>,
    pub public_access: Option<String>,
    pub default_locale: Option<String>,
    pub supported_locales: Option<LocaleList>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub external_id: Option<String>,
    pub extras: Option<Extras>,
}

impl UpdateSourceRequest {
    /// Validates the payload and applies it to `source`. Nothing is changed
    /// when validation fails.
    pub fn apply(self, source: &mut Source) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.is_some() {
            require_text("name", self.name.as_deref(), &mut errors);
        }
        let public_access =
            parse_choice::<AccessLevel>("public_access", self.public_access.as_deref(), &mut errors);
        errors.into_result()?;

        if let Some(name) = self.name {
            source.name = name;
        }
        if let Some(access) = public_access {
            source.public_access = access;
        }
        if let Some(locales) = self.supported_locales {
            source.supported_locales = locales.into_vec();
        }
        if let Some(extras) = self.extras {
            source.extras = extras;
        }
        replace(&mut source.full_name, self.full_name);
        replace(&mut source.source_type, self.source_type);
        replace(&mut source.default_locale, self.default_locale);
        replace(&mut source.website, self.website);
        replace(&mut source.description, self.description);
        replace(&mut source.external_id, self.external_id);
        source.touch();
        Ok(())
    }
}

fn replace(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}
