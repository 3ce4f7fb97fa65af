//! The Inertia request adapter.
//!
//! Wraps the rest of the pipeline and applies, in order:
//! 1. share default props (`errors`) plus whatever the hooks share
//! 2. register the lazy asset version
//! 3. run the inner handler
//! 4. version check: stale SPA GETs get a 409 with `X-Inertia-Location`
//! 5. redirect normalization: 302 after PUT/PATCH/DELETE becomes 303

use axum::{
    body::Body,
    http::{request::Parts, Method, Request, StatusCode},
    response::Response,
};
use std::future::Future;
use std::sync::Arc;

use crate::http::request::RequestSnapshot;
use crate::http::response::{is_redirect, is_unsafe_redirect_method, stale_version};
use crate::observability::metrics;
use crate::session::{resolve_validation_errors, SessionHandle, ERRORS_KEY};
use crate::shared::{InertiaContext, SharedProps, VersionResolver};

/// Application hooks for the adapter.
///
/// Both methods receive the request head and are called at most once per
/// request. `version` is only called when a version is actually needed.
pub trait InertiaHooks: Send + Sync + 'static {
    /// Current asset version. `None` turns version checks off.
    fn version(&self, _parts: &Parts) -> Option<String> {
        None
    }

    /// Extra props shared with every page. Entries here replace the
    /// built-in `errors` prop on key collision.
    fn share(&self, _parts: &Parts) -> SharedProps {
        SharedProps::new()
    }
}

/// No asset versioning, nothing shared beyond `errors`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHooks;

impl InertiaHooks for DefaultHooks {}

/// A fixed asset version, typically read from configuration.
#[derive(Clone, Debug, Default)]
pub struct StaticVersion(Option<String>);

impl StaticVersion {
    /// Numeric versions are compared by their decimal form.
    pub fn new(version: impl ToString) -> Self {
        Self(Some(version.to_string()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl From<Option<String>> for StaticVersion {
    fn from(version: Option<String>) -> Self {
        Self(version)
    }
}

impl InertiaHooks for StaticVersion {
    fn version(&self, _parts: &Parts) -> Option<String> {
        self.0.clone()
    }
}

/// The adapter. Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct InertiaAdapter {
    hooks: Arc<dyn InertiaHooks>,
}

impl InertiaAdapter {
    pub fn new<H: InertiaHooks>(hooks: H) -> Self {
        Self {
            hooks: Arc::new(hooks),
        }
    }

    pub fn from_arc(hooks: Arc<dyn InertiaHooks>) -> Self {
        Self { hooks }
    }

    /// Props shared with every page of this request.
    ///
    /// `errors` is registered first as a lazy read of the session's
    /// validation errors; hook shares are merged on top.
    pub fn share(&self, parts: &Parts) -> SharedProps {
        let session = parts.extensions.get::<SessionHandle>().cloned();

        let mut shared = SharedProps::new();
        shared.insert_lazy(ERRORS_KEY, move || resolve_validation_errors(session.as_ref()));
        shared.merge(self.hooks.share(parts));
        shared
    }

    /// Lazy version lookup backed by the hooks.
    pub fn version_resolver(&self, parts: &Parts) -> VersionResolver {
        let hooks = self.hooks.clone();
        let head = parts.clone();
        VersionResolver::new(move || hooks.version(&head))
    }

    /// Build the request-scoped context.
    pub fn context(&self, parts: &Parts, snapshot: &RequestSnapshot) -> InertiaContext {
        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        InertiaContext::new(
            self.share(parts),
            self.version_resolver(parts),
            url,
            snapshot.is_inertia,
        )
    }

    /// Run `next` with the Inertia context attached, then post-process its
    /// response.
    pub async fn handle<F, Fut>(&self, req: Request<Body>, next: F) -> Response
    where
        F: FnOnce(Request<Body>) -> Fut,
        Fut: Future<Output = Response>,
    {
        let (mut parts, body) = req.into_parts();
        let snapshot = RequestSnapshot::capture(&parts);
        let ctx = self.context(&parts, &snapshot);
        let version = ctx.version_resolver().clone();
        parts.extensions.insert(ctx);

        metrics::record_request(snapshot.is_inertia);

        let response = next(Request::from_parts(parts, body)).await;
        let response = self.check_version(&snapshot, &version, response);
        self.change_redirect_code(&snapshot, response)
    }

    /// Replace the response with a 409 when an SPA GET carries a stale
    /// asset version.
    pub fn check_version(
        &self,
        snapshot: &RequestSnapshot,
        version: &VersionResolver,
        response: Response,
    ) -> Response {
        if !snapshot.is_inertia || snapshot.method != Method::GET {
            return response;
        }

        let Some(server_version) = version.get() else {
            return response;
        };

        if snapshot.client_version == server_version {
            tracing::debug!(version = %server_version, "Asset version current");
            return response;
        }

        tracing::info!(
            url = %snapshot.full_url,
            client_version = %snapshot.client_version,
            server_version = %server_version,
            "Asset version mismatch, forcing full reload"
        );
        metrics::record_version_mismatch();

        if let Some(session) = &snapshot.session {
            session.reflash();
        }

        stale_version(&snapshot.full_url)
    }

    /// Turn a 302 after PUT/PATCH/DELETE into a 303 so the client follows
    /// it with GET.
    pub fn change_redirect_code(&self, snapshot: &RequestSnapshot, mut response: Response) -> Response {
        if is_redirect(&response)
            && snapshot.is_inertia
            && response.status() == StatusCode::FOUND
            && is_unsafe_redirect_method(&snapshot.method)
        {
            tracing::info!(method = %snapshot.method, url = %snapshot.full_url, "Rewriting 302 redirect to 303");
            metrics::record_redirect_rewritten(snapshot.method.as_str());
            *response.status_mut() = StatusCode::SEE_OTHER;
        }

        response
    }
}

impl Default for InertiaAdapter {
    fn default() -> Self {
        Self::new(DefaultHooks)
    }
}

impl std::fmt::Debug for InertiaAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InertiaAdapter").finish_non_exhaustive()
    }
}
