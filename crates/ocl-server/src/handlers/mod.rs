//! HTTP handler modules for the source dictionary API.
//!
//! Each sub-module implements thin handlers that parse requests, acquire the
//! service lock, delegate to [`DictionaryService`], and shape responses.
//! No business logic lives in handlers.
//!
//! [`DictionaryService`]: crate::service::DictionaryService

pub mod extras;
pub mod health;
pub mod sources;
pub mod versions;

use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use ocl_core::{OwnerRef, OwnerType};

use crate::error::ApiError;

/// Resolves the `{owner_kind}/{owner}` route prefix.
pub(crate) fn owner_ref(kind: &str, name: &str) -> Result<OwnerRef, ApiError> {
    Ok(OwnerRef::new(OwnerType::from_url_segment(kind)?, name))
}

/// A 201 response with a `Location` header.
pub(crate) fn created<T: Serialize>(location: &str, body: T) -> Response {
    let mut response = (StatusCode::CREATED, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(LOCATION, value);
    }
    response
}
