//! Request inspection for the Inertia protocol.
//!
//! # Responsibilities
//! - Name the protocol headers
//! - Detect SPA-protocol requests (`X-Inertia`)
//! - Read the client's asset version (`X-Inertia-Version`)
//! - Rebuild the full request URL for `X-Inertia-Location`
//!
//! # Design Decisions
//! - Read-only: nothing here touches the request
//! - A snapshot is taken before the request moves into the inner handler,
//!   so post-processing never needs the request back

use axum::http::{header, request::Parts, HeaderMap, Method, Uri};

use crate::session::SessionHandle;

/// Marker header sent by the SPA client on every protocol request.
pub const X_INERTIA: &str = "x-inertia";

/// Client's cached asset version.
pub const X_INERTIA_VERSION: &str = "x-inertia-version";

/// Location the client must hard-navigate to after a version mismatch.
pub const X_INERTIA_LOCATION: &str = "x-inertia-location";

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Returns true if the headers mark an SPA-protocol request.
///
/// Any non-empty value other than `0` or `false` counts as set. `false`
/// is rejected on purpose, so a client that sends the literal boolean
/// is treated as a plain browser visit.
pub fn is_inertia(headers: &HeaderMap) -> bool {
    headers
        .get(X_INERTIA)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            let v = v.trim();
            !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false")
        })
        .unwrap_or(false)
}

/// The asset version the client last saw. Absent means empty.
pub fn client_version(headers: &HeaderMap) -> String {
    headers
        .get(X_INERTIA_VERSION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Rebuild the full URL of the request, query string included.
///
/// Follows the usual server-side convention: the path's trailing slash is
/// dropped, so the site root renders as `http://host` and `/users/` as
/// `http://host/users`. A query on the root keeps its slash:
/// `http://host/?tab=profile`.
pub fn full_url(uri: &Uri, headers: &HeaderMap) -> String {
    let scheme = uri
        .scheme_str()
        .or_else(|| headers.get(X_FORWARDED_PROTO).and_then(|v| v.to_str().ok()))
        .unwrap_or("http");

    let host = uri
        .authority()
        .map(|a| a.as_str())
        .or_else(|| headers.get(header::HOST).and_then(|v| v.to_str().ok()))
        .unwrap_or("localhost");

    let base = format!("{}://{}{}", scheme, host, uri.path());
    let mut url = base.trim_end_matches('/').to_string();

    if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
        url.push_str(if uri.path() == "/" { "/?" } else { "?" });
        url.push_str(query);
    }

    url
}

/// Everything the adapter needs to know about a request once the request
/// itself has been handed to the inner handler.
#[derive(Clone, Debug)]
pub struct RequestSnapshot {
    pub method: Method,
    pub is_inertia: bool,
    pub client_version: String,
    pub full_url: String,
    pub session: Option<SessionHandle>,
}

impl RequestSnapshot {
    /// Capture the protocol-relevant parts of a request.
    pub fn capture(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            is_inertia: is_inertia(&parts.headers),
            client_version: client_version(&parts.headers),
            full_url: full_url(&parts.uri, &parts.headers),
            session: parts.extensions.get::<SessionHandle>().cloned(),
        }
    }

    /// True if the request has an active session.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }
}
