//! Resilient client for the Fayol personal-finance API.
//!
//! # Architecture Overview
//!
//! ```text
//!     services (auth, accounts, transactions, categories, budgets, goals, reports)
//!         │  RequestDescriptor
//!         ▼
//!     ┌──────────────────────────── ApiClient ─────────────────────────────┐
//!     │                                                                     │
//!     │   cache ──hit──▶ return (zero attempts)                             │
//!     │     │ miss                                                          │
//!     │     ▼                                                               │
//!     │   resilience: cancellation ▶ retries ▶ backoff ▶ per-attempt timeout│
//!     │     │                                                               │
//!     │     ▼                                                               │
//!     │   transport (reqwest, bearer token, request id) ──▶ Fayol backend   │
//!     │                                                                     │
//!     │   2xx read ▶ cache set        write ▶ invalidate GET:/<resource>    │
//!     └─────────────────────────────────────────────────────────────────────┘
//!
//!     Cross-cutting: config (TOML + validation), observability (tracing, metrics)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use fayol_client::{ApiClient, ClientConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ClientConfig::default())?;
//! client.set_token("access-token").await;
//! let accounts = client.accounts().list().await?;
//! println!("{} accounts", accounts.len());
//! # Ok(())
//! # }
//! ```

// Core
pub mod client;
pub mod error;
pub mod models;
pub mod services;

// Layers under the client
pub mod cache;
pub mod resilience;
pub mod transport;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use client::{ApiClient, ClientBuilder, Response};
pub use config::{load_config, ClientConfig, ConfigError};
pub use error::{ApiError, ApiResult, ClientError, ErrorClass};
pub use resilience::CallOptions;
pub use transport::{Method, RequestDescriptor, TokenStore, Transport};
