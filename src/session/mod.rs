//! Session capability consumed by the adapter.
//!
//! # Data Flow
//! ```text
//! session_middleware (store.rs)
//!     → load or create MemorySession by cookie
//!     → SessionHandle into request extensions
//!     → adapter reads it (errors, reflash)
//!     → flash data aged after the response
//! ```
//!
//! # Design Decisions
//! - The adapter only sees the [`Session`] trait; storage is pluggable
//! - Session access is synchronous; backends doing I/O keep it behind
//!   their own handle
//! - Validation errors are read, never written or cleared, by the adapter

pub mod errors;
pub mod memory;
pub mod store;

use serde_json::Value;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

pub use errors::{resolve_validation_errors, ErrorBagError, MessageBag, ViewErrorBag, ERRORS_KEY};
pub use memory::MemorySession;
pub use store::{session_middleware, MemorySessionStore};

/// What the adapter needs from a session.
pub trait Session: Send + Sync {
    /// True if `key` holds a value.
    fn has(&self, key: &str) -> bool;

    /// Value stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Keep all flash data alive for one more request.
    fn reflash(&self);
}

/// Cloneable handle to the session of the request in flight.
///
/// Session middleware inserts it into the request extensions; its
/// presence is what "the request has a session" means.
#[derive(Clone)]
pub struct SessionHandle(Arc<dyn Session>);

impl SessionHandle {
    pub fn new<S: Session + 'static>(session: S) -> Self {
        Self(Arc::new(session))
    }

    pub fn from_arc(session: Arc<dyn Session>) -> Self {
        Self(session)
    }
}

impl Deref for SessionHandle {
    type Target = dyn Session;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionHandle(..)")
    }
}
