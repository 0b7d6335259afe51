//! Storage abstraction for OCL source dictionaries.
//!
//! Provides the [`DictionaryStore`] trait defining the storage contract that
//! all backends implement, plus the [`InMemoryStore`] and [`SqliteStore`] as
//! first-class backends.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`query`]: ChildFilter for concept/mapping lookups
//! - [`traits`]: DictionaryStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL migrations and connection setup
//! - [`sqlite`]: SqliteStore implementation

pub mod error;
pub mod memory;
pub mod query;
pub mod schema;
pub mod sqlite;
pub mod traits;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use query::ChildFilter;
pub use sqlite::SqliteStore;
pub use traits::DictionaryStore;
