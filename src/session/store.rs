//! Cookie-keyed in-memory session store and its middleware.
//!
//! # Design Decisions
//! - Sessions idle for longer than the configured timeout are dropped
//! - Expiry is lazy: a stale session is removed when it is looked up, and
//!   the whole map is swept whenever a new session is created

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::session::{MemorySession, Session, SessionHandle};

/// Default idle lifetime of a session.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug)]
struct StoredSession {
    session: Arc<MemorySession>,
    last_seen: Instant,
}

/// Sessions keyed by the id carried in the session cookie.
#[derive(Clone, Debug)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<String, StoredSession>>,
    cookie_name: String,
    idle_timeout: Duration,
}

impl MemorySessionStore {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            cookie_name: cookie_name.into(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Look up a live session and mark it as seen.
    ///
    /// A session past its idle timeout is removed and reported missing.
    pub fn get(&self, id: &str) -> Option<Arc<MemorySession>> {
        let now = Instant::now();
        {
            let mut entry = self.sessions.get_mut(id)?;
            if now.duration_since(entry.last_seen) <= self.idle_timeout {
                entry.last_seen = now;
                return Some(entry.session.clone());
            }
        }

        self.sessions.remove(id);
        tracing::debug!(session_id = %id, "Session expired");
        None
    }

    /// Create a session under a fresh random id.
    pub fn create(&self) -> Arc<MemorySession> {
        self.evict_idle();

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(MemorySession::new(id.clone()));
        self.sessions.insert(
            id,
            StoredSession {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        session
    }

    /// Drop every session idle for longer than the timeout. Returns how
    /// many were removed.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, stored| now.duration_since(stored.last_seen) <= self.idle_timeout);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The session named by the request cookie, if the store knows it.
    fn session_for(&self, headers: &HeaderMap) -> Option<Arc<MemorySession>> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .and_then(|(_, id)| self.get(id))
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new("inertia_session")
    }
}

/// Attach a session to every request.
///
/// Inserts both the [`SessionHandle`] the adapter reads and the concrete
/// `Arc<MemorySession>` for handlers that write flash data. Flash data is
/// aged once the inner handler has produced its response.
pub async fn session_middleware(
    State(store): State<MemorySessionStore>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let (session, is_new) = match store.session_for(req.headers()) {
        Some(session) => (session, false),
        None => (store.create(), true),
    };

    let handle: Arc<dyn Session> = session.clone();
    req.extensions_mut().insert(SessionHandle::from_arc(handle));
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;
    session.age_flash();

    if is_new {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            store.cookie_name,
            session.id()
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Failed to build session cookie"),
        }
        tracing::debug!(session_id = %session.id(), "Session started");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Extension, Router};
    use serde_json::json;
    use tower::ServiceExt;

    fn app(store: MemorySessionStore) -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(session): Extension<Arc<MemorySession>>| async move {
                    session.flash("status", json!("hello"));
                    session.id().to_string()
                }),
            )
            .layer(axum::middleware::from_fn_with_state(store, session_middleware))
    }

    #[tokio::test]
    async fn test_new_session_sets_cookie() {
        let store = MemorySessionStore::new("sid");
        let response = app(store.clone())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("sid="));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_session_is_reused() {
        let store = MemorySessionStore::new("sid");
        let session = store.create();

        let response = app(store.clone())
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::COOKIE, format!("theme=dark; sid={}", session.id()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(store.len(), 1);
        // flashed during the request, aged once: still readable next time
        assert!(session.has("status"));
    }

    #[tokio::test]
    async fn test_unknown_cookie_starts_new_session() {
        let store = MemorySessionStore::new("sid");
        let response = app(store.clone())
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::COOKIE, "sid=stale")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get(header::SET_COOKIE).is_some());
        assert!(store.get("stale").is_none());
    }

    #[tokio::test]
    async fn test_idle_session_is_evicted() {
        let store = MemorySessionStore::new("sid").with_idle_timeout(Duration::from_millis(20));
        let idle = store.create();
        std::thread::sleep(Duration::from_millis(50));

        assert!(store.get(idle.id()).is_none());
        assert!(store.is_empty());

        let response = app(store.clone())
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::COOKIE, format!("sid={}", idle.id()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().get(header::SET_COOKIE).is_some());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_cookieless_requests_do_not_pile_up() {
        let store = MemorySessionStore::new("sid").with_idle_timeout(Duration::from_millis(500));
        for _ in 0..50 {
            app(store.clone())
                .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
                .await
                .unwrap();
        }
        assert_eq!(store.len(), 50);

        std::thread::sleep(Duration::from_millis(600));
        assert_eq!(store.evict_idle(), 50);

        // creating a session sweeps the rest
        for _ in 0..3 {
            store.create();
        }
        std::thread::sleep(Duration::from_millis(600));
        store.create();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_active_session_is_kept() {
        let store = MemorySessionStore::new("sid").with_idle_timeout(Duration::from_secs(60));
        let session = store.create();
        assert_eq!(store.evict_idle(), 0);
        assert!(store.get(session.id()).is_some());
    }
}
