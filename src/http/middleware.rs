//! Axum entry point for the adapter.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::adapter::InertiaAdapter;

/// Middleware function for `axum::middleware::from_fn_with_state`.
///
/// ```rust,no_run
/// use axum::{routing::get, Router};
/// use inertia_middleware::http::{inertia_middleware, InertiaAdapter, StaticVersion};
///
/// let adapter = InertiaAdapter::new(StaticVersion::new("1.0.0"));
/// let app: Router = Router::new()
///     .route("/", get(|| async { "ok" }))
///     .layer(axum::middleware::from_fn_with_state(adapter, inertia_middleware));
/// ```
pub async fn inertia_middleware(
    State(adapter): State<InertiaAdapter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    adapter.handle(request, |req| next.run(req)).await
}
