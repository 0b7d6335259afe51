//! Domain model for OCL source dictionaries.
//!
//! Sources own versions; versions reference concepts and mappings by id.
//! Nothing here touches persistence or HTTP.

pub mod child;
pub mod error;
pub mod id;
pub mod source;
pub mod validation;
pub mod version;

// Re-export commonly used types
pub use child::{ConceptVersion, Mapping};
pub use error::CoreError;
pub use id::{ConceptId, MappingId, SourceId, VersionId};
pub use source::{AccessLevel, Extras, OwnerRef, OwnerType, Source};
pub use validation::{FieldErrors, NON_FIELD_ERRORS};
pub use version::{
    is_reserved_version_mnemonic, SourceVersion, INITIAL_VERSION, LATEST_VERSION,
    RESERVED_VERSION_MNEMONICS,
};
