//! Inertia protocol middleware for Axum.
//!
//! Bridges a server-side Axum pipeline to an Inertia SPA client:
//! asset version negotiation, redirect normalization after unsafe
//! methods, and validation errors shared with every page.

pub mod config;
pub mod http;
pub mod observability;
pub mod page;
pub mod session;
pub mod shared;

pub use config::AppConfig;
pub use http::{inertia_middleware, AppServer, InertiaAdapter, InertiaHooks, StaticVersion};
pub use page::Page;
pub use session::{Session, SessionHandle};
pub use shared::{InertiaContext, PropValue, SharedProps};
