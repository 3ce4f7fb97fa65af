//! HTTP server setup for the demo application.
//!
//! # Responsibilities
//! - Create the Axum router with the demo pages
//! - Wire up middleware (tracing, sessions, Inertia adapter)
//! - Serve on a listener until shutdown

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::http::adapter::{InertiaAdapter, StaticVersion};
use crate::http::middleware::inertia_middleware;
use crate::session::{session_middleware, MemorySession, MemorySessionStore, MessageBag, ViewErrorBag, ERRORS_KEY};
use crate::shared::InertiaContext;

/// HTTP server for the demo application.
pub struct AppServer {
    router: Router,
    config: AppConfig,
}

impl AppServer {
    pub fn new(config: AppConfig) -> Self {
        let router = Self::build_router(&config);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Sessions wrap the adapter so the adapter sees the session handle.
    pub fn build_router(config: &AppConfig) -> Router {
        let adapter = InertiaAdapter::new(StaticVersion::from(config.inertia.version.clone()));
        let sessions = MemorySessionStore::new(config.session.cookie_name.clone())
            .with_idle_timeout(Duration::from_secs(config.session.idle_timeout_secs));

        Router::new()
            .route("/", get(home))
            .route("/users/{id}", get(edit_user).put(update_user))
            .layer(axum::middleware::from_fn_with_state(adapter, inertia_middleware))
            .layer(axum::middleware::from_fn_with_state(sessions, session_middleware))
            .layer(TraceLayer::new_for_http())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` completes.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            version = ?self.config.inertia.version,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn home(ctx: InertiaContext, Extension(session): Extension<Arc<MemorySession>>) -> Response {
    let status = session.all().get("status").cloned();
    ctx.render("Home", json!({ "status": status }))
}

async fn edit_user(ctx: InertiaContext, Path(id): Path<u64>) -> Response {
    ctx.render("User/Edit", json!({ "user": { "id": id } }))
}

#[derive(Debug, Deserialize)]
struct UserForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

/// Validates and "saves" the user. Both outcomes answer with a 302,
/// which the adapter turns into a 303 for SPA clients.
async fn update_user(
    Extension(session): Extension<Arc<MemorySession>>,
    Path(id): Path<u64>,
    Json(form): Json<UserForm>,
) -> Response {
    let mut bag = MessageBag::new();
    if form.name.trim().is_empty() {
        bag = bag.add("name", "The name field is required.");
    }
    if !form.email.contains('@') {
        bag = bag.add("email", "Not a valid email address.");
    }

    let location = if bag.is_empty() {
        tracing::debug!(user_id = id, "User updated");
        session.flash("status", json!("Profile saved."));
        "/".to_string()
    } else {
        session.flash(ERRORS_KEY, ViewErrorBag::new().put("default", bag).to_value());
        format!("/users/{}", id)
    };

    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
