//! Inertia protocol handling over HTTP.
//!
//! `server.rs` wires the demo application around these pieces.
//!
//! # Data Flow
//! ```text
//! Request
//!     → middleware.rs (axum entry point)
//!     → adapter.rs (share props, register version, call inner handler)
//!     → request.rs (protocol headers, snapshot, full URL)
//!     → inner handler renders a page (see crate::page)
//!     → adapter.rs (version check, redirect normalization)
//!     → response.rs (409 stale-version response, redirect predicates)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Request is only read; the context rides in its extensions
//! - Version check runs before redirect normalization
//! - Failures of the inner handler pass through untouched

pub mod adapter;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use adapter::{DefaultHooks, InertiaAdapter, InertiaHooks, StaticVersion};
pub use middleware::inertia_middleware;
pub use request::{X_INERTIA, X_INERTIA_LOCATION, X_INERTIA_VERSION};
pub use server::AppServer;
