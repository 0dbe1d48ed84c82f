//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor (from a typed service)
//!     → OutgoingRequest (body serialized, request id assigned)
//!     → Transport::send (one HTTP round trip)
//!     → RawResponse (any status) or Network/Timeout error
//! ```
//!
//! # Design Decisions
//! - A transport makes exactly one attempt; retry and caching live above it
//! - Non-2xx statuses are not errors at this level
//! - The trait is object safe so the client can hold `Arc<dyn Transport>`

use async_trait::async_trait;

use crate::error::ApiError;

pub mod auth;
pub mod http;
pub mod request;
pub mod response;

#[cfg(test)]
pub(crate) mod mock;

pub use auth::{MemoryTokenStore, TokenStore};
pub use http::HttpTransport;
pub use request::{Method, OutgoingRequest, RequestDescriptor};
pub use response::RawResponse;

/// A single-attempt HTTP round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutgoingRequest) -> Result<RawResponse, ApiError>;
}
