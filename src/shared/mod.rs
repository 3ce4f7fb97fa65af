//! Request-scoped shared state.
//!
//! # Data Flow
//! ```text
//! adapter (per request)
//!     → props.rs (default "errors" + hook shares, merged)
//!     → version.rs (lazy version resolver)
//!     → context.rs (InertiaContext in request extensions)
//!     → handler extracts InertiaContext
//!     → page rendering resolves lazy props
//! ```
//!
//! # Design Decisions
//! - Nothing here is global: each request gets its own context
//! - Lazy props are plain closures, evaluated at render time
//! - Later shares overwrite earlier ones on key collision

pub mod context;
pub mod props;
pub mod version;

pub use context::{ContextMissing, InertiaContext};
pub use props::{LazyProp, PropValue, SharedProps};
pub use version::VersionResolver;
