//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! adapter, session store, page rendering
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape (optional)
//! ```

pub mod logging;
pub mod metrics;
