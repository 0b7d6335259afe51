//! Request plumbing shared by every resource.
//!
//! Bodies are read as bytes and decoded here rather than through
//! `axum::Json`, so every failure uses the standard error envelope. Broken
//! JSON is a `BAD_REQUEST`; a value of the wrong type is a field error keyed
//! by the offending member.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use ocl_core::{FieldErrors, NON_FIELD_ERRORS};

use crate::error::ApiError;

/// A JSON request body decoded on extraction.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = DeferredBody::from_request(req, state).await?;
        Ok(JsonBody(body.decode()?))
    }
}

/// A request body kept as raw bytes until the resource it targets has been
/// resolved, so lookup failures win over payload errors.
#[derive(Debug, Clone)]
pub struct DeferredBody(Bytes);

impl DeferredBody {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value: Value = serde_json::from_slice(&self.0)
            .map_err(|e| ApiError::BadRequest(format!("malformed JSON body: {}", e)))?;
        decode_value(value)
    }
}

impl<S> FromRequest<S> for DeferredBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(DeferredBody(bytes))
    }
}

impl From<Value> for DeferredBody {
    fn from(value: Value) -> Self {
        DeferredBody(Bytes::from(value.to_string()))
    }
}

/// Decodes a parsed body into `T`.
///
/// Request types take every member as optional, so when the whole object
/// fails each member is retried alone to find the ones at fault.
pub fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    let whole = match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => return Ok(decoded),
        Err(e) => e,
    };
    let Value::Object(members) = value else {
        return Err(ApiError::BadRequest(format!(
            "request body must be a JSON object: {}",
            whole
        )));
    };
    let mut errors = FieldErrors::new();
    for (key, member) in members {
        let alone = Value::Object(Map::from_iter([(key.clone(), member)]));
        if let Err(e) = serde_json::from_value::<T>(alone) {
            errors.add(&key, e.to_string());
        }
    }
    if errors.is_empty() {
        errors.add(NON_FIELD_ERRORS, whole.to_string());
    }
    Err(errors.into())
}

/// Timestamp format used in every view.
pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A locale list given either as a JSON array or as a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LocaleList {
    List(Vec<String>),
    Delimited(String),
}

impl LocaleList {
    pub fn into_vec(self) -> Vec<String> {
        let raw = match self {
            LocaleList::List(items) => items,
            LocaleList::Delimited(s) => s.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

/// Parses an enum-valued field, recording a choice error when it is unknown.
pub fn parse_choice<T: std::str::FromStr>(
    field: &str,
    value: Option<&str>,
    errors: &mut FieldErrors,
) -> Option<T> {
    let value = value?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.add(
                field,
                format!("Select a valid choice. {} is not one of the available choices.", value),
            );
            None
        }
    }
}
