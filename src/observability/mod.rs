//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client / resilience / cache
//!     → tracing events (request id, attempt, delay, status)
//!     → metrics.rs (counters, histogram, cache gauge)
//!
//! Binaries:
//!     → logging.rs installs the subscriber
//! ```

pub mod logging;
pub mod metrics;
