//! HTTP/JSON API server for OCL source dictionaries.
//!
//! Exposes CRUD and versioning endpoints for sources, their versions and
//! their extras, with optional nested concept and mapping inclusion. This
//! crate contains the server framework, API schema types, permission model,
//! search and pagination, error handling, and route definitions.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pagination;
pub mod params;
pub mod permissions;
pub mod router;
pub mod schema;
pub mod search;
pub mod service;
pub mod state;
