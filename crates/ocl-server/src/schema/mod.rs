//! API schema types for request/response definitions.
//!
//! Each sub-module defines the request and response types for a specific
//! API resource. Types use serde derives for JSON serialization and
//! deserialization. Mnemonics travel as `id` on the wire.

pub mod children;
pub mod common;
pub mod sources;
pub mod versions;
