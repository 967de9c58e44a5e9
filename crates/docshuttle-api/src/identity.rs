//! Client identity middleware and extractor.
//!
//! Clients are identified by an opaque `uuid` cookie. The middleware reads it,
//! minting a fresh v4 UUID when it is absent, and makes the identity available
//! to handlers through request extensions. A minted identity is written back
//! on the response so the same client keeps its namespace across requests.
//! There is no validation and no session: the cookie value is nothing more
//! than a storage namespace key.

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use docshuttle_core::AppError;
use uuid::Uuid;

use crate::constants::IDENTITY_COOKIE;
use crate::error::HttpAppError;

/// Opaque identity of the calling client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ClientId>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Internal(
                    "Identity middleware not installed".to_string(),
                ))
            })
    }
}

/// Read the identity cookie, minting one when absent, and expose the identity
/// to the handler. Newly minted identities are set on the response.
pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    let existing = cookie_value(&request, IDENTITY_COOKIE);
    let minted = existing.is_none();
    let client_id = existing.unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(ClientId(client_id.clone()));

    let mut response = next.run(request).await;

    if minted {
        let cookie = format!("{}={}; Path=/; SameSite=Lax", IDENTITY_COOKIE, client_id);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode identity cookie");
            }
        }
    }

    response
}

fn cookie_value(request: &Request, name: &str) -> Option<String> {
    let header = request.headers().get(header::COOKIE)?.to_str().ok()?;

    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_cookie(cookie: &str) -> Request {
        Request::builder()
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_cookie_value_parses_among_others() {
        let request = request_with_cookie("theme=dark; uuid=client-a; lang=en");
        assert_eq!(
            cookie_value(&request, "uuid"),
            Some("client-a".to_string())
        );
    }

    #[test]
    fn test_empty_cookie_value_counts_as_absent() {
        let request = request_with_cookie("uuid=");
        assert_eq!(cookie_value(&request, "uuid"), None);
    }

    #[test]
    fn test_missing_cookie_header() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(cookie_value(&request, "uuid"), None);
    }
}
