//! Caller identity.
//!
//! The caller is named by the `X-User` header; requests without it are
//! anonymous. Staff status comes from [`ServerConfig::staff_users`].
//!
//! [`ServerConfig::staff_users`]: crate::config::ServerConfig::staff_users

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::permissions::Access;
use crate::state::AppState;

/// Header carrying the caller's user name.
pub const USER_HEADER: &str = "X-User";

/// The caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    User { username: String, staff: bool },
}

impl Principal {
    pub fn user(username: impl Into<String>) -> Self {
        Principal::User {
            username: username.into(),
            staff: false,
        }
    }

    pub fn staff(username: impl Into<String>) -> Self {
        Principal::User {
            username: username.into(),
            staff: true,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Principal::Anonymous => None,
            Principal::User { username, .. } => Some(username),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Principal::User { staff: true, .. })
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Principal::Anonymous)
    }
}

/// Reads the principal from request headers.
///
/// An empty or non-UTF-8 header is rejected rather than treated as anonymous.
pub fn extract_principal(
    headers: &HeaderMap,
    config: &ServerConfig,
) -> Result<Principal, ApiError> {
    let Some(value) = headers.get(USER_HEADER) else {
        return Ok(Principal::Anonymous);
    };
    let username = value
        .to_str()
        .map(str::trim)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("malformed {} header", USER_HEADER)))?;
    Ok(Principal::User {
        username: username.to_string(),
        staff: config.is_staff(username),
    })
}

/// The caller together with the access level its HTTP method requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub principal: Principal,
    pub access: Access,
}

impl Caller {
    pub fn new(principal: Principal, access: Access) -> Self {
        Caller { principal, access }
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = extract_principal(&parts.headers, &state.config)?;
        Ok(Caller::new(principal, Access::for_method(&parts.method)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config_with_staff() -> ServerConfig {
        ServerConfig {
            staff_users: vec!["root".into()],
            ..ServerConfig::default()
        }
    }

    #[test]
    fn missing_header_is_anonymous() {
        let principal = extract_principal(&HeaderMap::new(), &config_with_staff()).unwrap();
        assert_eq!(principal, Principal::Anonymous);
        assert!(!principal.is_authenticated());
    }

    #[test]
    fn header_names_user_and_staff_flag() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("root"));
        let principal = extract_principal(&headers, &config_with_staff()).unwrap();
        assert!(principal.is_staff());
        assert_eq!(principal.username(), Some("root"));

        headers.insert(USER_HEADER, HeaderValue::from_static("alice"));
        let principal = extract_principal(&headers, &config_with_staff()).unwrap();
        assert_eq!(principal, Principal::user("alice"));
    }

    #[test]
    fn blank_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("  "));
        assert!(matches!(
            extract_principal(&headers, &config_with_staff()),
            Err(ApiError::BadRequest(_))
        ));
    }
}
