//! Response shaping for the Inertia protocol.
//!
//! # Responsibilities
//! - Manufacture the 409 stale-version response
//! - Classify redirect responses
//! - Rewrite ambiguous 302s to 303 for unsafe methods
//!
//! # Design Decisions
//! - Only the status code of an existing response is ever touched
//! - Headers and body of redirects pass through untouched

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, StatusCode},
    response::Response,
};

use crate::http::request::X_INERTIA_LOCATION;

/// Build the response that tells the client to hard-navigate to `location`.
///
/// Empty body, status 409. A location that is not a valid header value is
/// dropped rather than failing the request.
pub fn stale_version(location: &str) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::CONFLICT;

    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(X_INERTIA_LOCATION, value);
        }
        Err(e) => {
            tracing::warn!(location = %location, error = %e, "Location is not a valid header value");
        }
    }

    response
}

/// A redirect is a 3xx response that carries a `Location`.
pub fn is_redirect(response: &Response) -> bool {
    response.status().is_redirection() && response.headers().contains_key(header::LOCATION)
}

/// Methods the client must not replay when following a redirect.
pub fn is_unsafe_redirect_method(method: &Method) -> bool {
    matches!(*method, Method::PUT | Method::PATCH | Method::DELETE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stale_version_response() {
        let response = stale_version("http://localhost/users?page=2");

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response.headers().get(X_INERTIA_LOCATION).unwrap(),
            "http://localhost/users?page=2"
        );

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_is_redirect_requires_location() {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::FOUND;
        assert!(!is_redirect(&response));

        response
            .headers_mut()
            .insert(header::LOCATION, HeaderValue::from_static("/"));
        assert!(is_redirect(&response));

        *response.status_mut() = StatusCode::OK;
        assert!(!is_redirect(&response));
    }

    #[test]
    fn test_unsafe_methods() {
        assert!(is_unsafe_redirect_method(&Method::PUT));
        assert!(is_unsafe_redirect_method(&Method::PATCH));
        assert!(is_unsafe_redirect_method(&Method::DELETE));
        assert!(!is_unsafe_redirect_method(&Method::GET));
        assert!(!is_unsafe_redirect_method(&Method::POST));
    }
}
