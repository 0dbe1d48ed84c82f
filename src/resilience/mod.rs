//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call from the client:
//!     → cancellation.rs (caller token / overall deadline wraps everything)
//!     → retries.rs (attempt loop, classification, backoff sleep)
//!     → timeouts.rs (per-attempt deadline around the transport)
//!     → backoff.rs (delay between attempts)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Retries only for calls the caller marked idempotent
//! - Cancellation is distinct from timeout and is never retried

pub mod backoff;
pub mod cancellation;
pub mod retries;
pub mod timeouts;

pub use cancellation::{CallOptions, CancelScope};
pub use retries::{Attempted, Retrier, RetryCondition, RetryPolicy};
