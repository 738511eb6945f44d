//! Request authentication.
//!
//! Session handling lives in a fronting proxy. The API only needs to know
//! which user is calling, for rate limiting and logging.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::types::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// No authenticated user on the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthorized;

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, Unauthorized>;
}

pub type SharedAuthenticator = Arc<dyn Authenticator>;

/// Trusts identity headers set by the session proxy
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderAuthenticator;

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Authenticator for HeaderAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, Unauthorized> {
        let id = header_value(headers, USER_ID_HEADER).ok_or(Unauthorized)?;
        Ok(AuthUser {
            id: UserId::new(id),
            email: header_value(headers, USER_EMAIL_HEADER),
            name: header_value(headers, USER_NAME_HEADER),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_authenticator() {
        let mut headers = HeaderMap::new();
        assert_eq!(HeaderAuthenticator.authenticate(&headers), Err(Unauthorized));

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  "));
        assert_eq!(HeaderAuthenticator.authenticate(&headers), Err(Unauthorized));

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("user-42"));
        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_static("pat@example.com"));
        let user = HeaderAuthenticator.authenticate(&headers).unwrap();
        assert_eq!(user.id.as_str(), "user-42");
        assert_eq!(user.email.as_deref(), Some("pat@example.com"));
        assert_eq!(user.name, None);
    }
}
