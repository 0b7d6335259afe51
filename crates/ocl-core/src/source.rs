//! Source dictionaries and their ownership/access vocabulary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::SourceId;

/// Free-form key/value attributes attached to sources and versions.
pub type Extras = serde_json::Map<String, serde_json::Value>;

/// Who owns a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerType {
    User,
    Organization,
}

impl OwnerType {
    /// Parses the first URL segment of an owner-scoped route (`users`/`orgs`).
    pub fn from_url_segment(segment: &str) -> Result<Self, CoreError> {
        match segment {
            "users" => Ok(OwnerType::User),
            "orgs" => Ok(OwnerType::Organization),
            other => Err(CoreError::UnknownOwnerKind(other.to_string())),
        }
    }

    pub fn url_segment(self) -> &'static str {
        match self {
            OwnerType::User => "users",
            OwnerType::Organization => "orgs",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OwnerType::User => "User",
            OwnerType::Organization => "Organization",
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(OwnerType::User),
            "Organization" => Ok(OwnerType::Organization),
            other => Err(CoreError::UnknownOwnerType(other.to_string())),
        }
    }
}

/// A fully-qualified owner: kind plus user name or organization mnemonic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerRef {
    pub owner_type: OwnerType,
    pub name: String,
}

impl OwnerRef {
    pub fn new(owner_type: OwnerType, name: impl Into<String>) -> Self {
        OwnerRef {
            owner_type,
            name: name.into(),
        }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self::new(OwnerType::User, name)
    }

    pub fn org(name: impl Into<String>) -> Self {
        Self::new(OwnerType::Organization, name)
    }

    /// Relative URL of the owner, e.g. `/orgs/WHO/`.
    pub fn url(&self) -> String {
        format!("/{}/{}/", self.owner_type.url_segment(), self.name)
    }
}

/// Public access granted to callers who neither own nor administer a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessLevel {
    #[default]
    View,
    Edit,
    None,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::View => "View",
            AccessLevel::Edit => "Edit",
            AccessLevel::None => "None",
        }
    }

    /// Whether anyone may read the resource.
    pub fn allows_view(self) -> bool {
        matches!(self, AccessLevel::View | AccessLevel::Edit)
    }

    /// Whether any authenticated caller may modify the resource.
    pub fn allows_edit(self) -> bool {
        self == AccessLevel::Edit
    }
}

impl FromStr for AccessLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "View" => Ok(AccessLevel::View),
            "Edit" => Ok(AccessLevel::Edit),
            "None" => Ok(AccessLevel::None),
            other => Err(CoreError::UnknownAccessLevel(other.to_string())),
        }
    }
}

/// A terminology source dictionary.
///
/// `id` is assigned by storage; values built with [`Source::new`] carry
/// `SourceId(0)` until persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    pub mnemonic: String,
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
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Source {
    pub fn new(owner: &OwnerRef, mnemonic: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Source {
            id: SourceId(0),
            mnemonic: mnemonic.into(),
            name: name.into(),
            full_name: None,
            source_type: None,
            public_access: AccessLevel::default(),
            default_locale: None,
            supported_locales: Vec::new(),
            website: None,
            description: None,
            external_id: None,
            extras: Extras::new(),
            owner: owner.name.clone(),
            owner_type: owner.owner_type,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn owner_ref(&self) -> OwnerRef {
        OwnerRef::new(self.owner_type, self.owner.clone())
    }

    /// Relative URL of the source, e.g. `/orgs/WHO/sources/ICD-10/`.
    pub fn url(&self) -> String {
        format!("{}sources/{}/", self.owner_ref().url(), self.mnemonic)
    }

    /// All locales the source declares, default first.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.default_locale
            .as_deref()
            .into_iter()
            .chain(self.supported_locales.iter().map(String::as_str))
    }

    /// Marks the record as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
