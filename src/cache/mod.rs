//! Response cache subsystem.
//!
//! # Data Flow
//! ```text
//! Cacheable read:
//!     key.rs (METHOD:/path?sorted-query)
//!     → store.rs get → hit: return without touching the transport
//!                    → miss: real call, store 2xx body with TTL
//!
//! Write (POST/PUT/PATCH/DELETE):
//!     key.rs resource_prefix(path) → store.rs invalidate(prefix)
//! ```
//!
//! # Design Decisions
//! - One cache instance per client, created and dropped with it
//! - No dependency tracking: correctness relies on the client invalidating
//!   the resource prefix after every write
//! - Failures are never cached; a miss is not an error

pub mod key;
pub mod store;

pub use key::{derive_key, key_for, normalize_path, resource_prefix};
pub use store::{CacheEntry, ResponseCache};
