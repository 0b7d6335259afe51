//! Handlers for a source's free-form `extras` map.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use ocl_core::Extras;

use super::owner_ref;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::schema::common::JsonBody;
use crate::state::AppState;

fn single(key: String, value: Value) -> Json<Extras> {
    let mut extras = Extras::new();
    extras.insert(key, value);
    Json(extras)
}

/// `GET /{owner_kind}/{owner}/sources/{source}/extras`
pub async fn get_extras(
    State(state): State<AppState>,
    Path((kind, owner, source)): Path<(String, String, String)>,
    caller: Caller,
) -> Result<Json<Extras>, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let service = state.service.lock().await;
    Ok(Json(service.get_extras(&caller, &owner, &source)?))
}

/// `GET /{owner_kind}/{owner}/sources/{source}/extras/{key}`
pub async fn get_extra(
    State(state): State<AppState>,
    Path((kind, owner, source, key)): Path<(String, String, String, String)>,
    caller: Caller,
) -> Result<Json<Extras>, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let service = state.service.lock().await;
    let value = service.get_extra(&caller, &owner, &source, &key)?;
    Ok(single(key, value))
}

/// Sets one extra. The body must be `{"<key>": <value>}`.
///
/// `PUT /{owner_kind}/{owner}/sources/{source}/extras/{key}`
pub async fn put_extra(
    State(state): State<AppState>,
    Path((kind, owner, source, key)): Path<(String, String, String, String)>,
    caller: Caller,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Extras>, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let mut service = state.service.lock().await;
    let value = service.put_extra(&caller, &owner, &source, &key, body)?;
    Ok(single(key, value))
}

/// `DELETE /{owner_kind}/{owner}/sources/{source}/extras/{key}`
pub async fn delete_extra(
    State(state): State<AppState>,
    Path((kind, owner, source, key)): Path<(String, String, String, String)>,
    caller: Caller,
) -> Result<StatusCode, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let mut service = state.service.lock().await;
    service.delete_extra(&caller, &owner, &source, &key)?;
    Ok(StatusCode::NO_CONTENT)
}
