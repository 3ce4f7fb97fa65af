//! Request-scoped Inertia state.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::shared::props::SharedProps;
use crate::shared::version::VersionResolver;

/// Shared props and version resolver for the request in flight.
///
/// Created by the adapter on every request and carried in the request
/// extensions. Handlers take it as an extractor and hand it to the
/// rendering layer.
#[derive(Clone, Debug, Default)]
pub struct InertiaContext {
    shared: SharedProps,
    version: VersionResolver,
    url: String,
    is_inertia: bool,
}

impl InertiaContext {
    pub fn new(shared: SharedProps, version: VersionResolver, url: String, is_inertia: bool) -> Self {
        Self {
            shared,
            version,
            url,
            is_inertia,
        }
    }

    pub fn shared(&self) -> &SharedProps {
        &self.shared
    }

    /// Handlers may share more props after the middleware ran.
    pub fn shared_mut(&mut self) -> &mut SharedProps {
        &mut self.shared
    }

    pub fn version(&self) -> Option<&str> {
        self.version.get()
    }

    pub fn version_resolver(&self) -> &VersionResolver {
        &self.version
    }

    /// Request path and query, as reported in the page object.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_inertia(&self) -> bool {
        self.is_inertia
    }
}

/// Rejection when a handler asks for [`InertiaContext`] on a route the
/// middleware does not cover.
#[derive(Debug, Error)]
#[error("Inertia middleware is not installed on this route")]
pub struct ContextMissing;

impl IntoResponse for ContextMissing {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

impl<S> FromRequestParts<S> for InertiaContext
where
    S: Send + Sync,
{
    type Rejection = ContextMissing;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<InertiaContext>()
            .cloned()
            .ok_or(ContextMissing)
    }
}
