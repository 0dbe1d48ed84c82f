//! Request descriptors built by typed services.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use uuid::Uuid;

/// HTTP method of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// True for methods that never change server state.
    pub fn is_read(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Describes one logical call.
///
/// `GET` descriptors start out cacheable and idempotent; every other method
/// starts out neither. Callers opt writes into retries with
/// [`RequestDescriptor::idempotent`] when repeating them is safe.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub cacheable: bool,
    /// Overrides the derived cache key.
    pub cache_key: Option<String>,
    /// Overrides the client's default TTL.
    pub cache_ttl: Option<Duration>,
    pub idempotent: bool,
    /// Overrides the client's per-attempt timeout.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let read = method.is_read();
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            cacheable: read,
            cache_key: None,
            cache_ttl: None,
            idempotent: read,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Neither read from nor write to the response cache.
    pub fn no_cache(mut self) -> Self {
        self.cacheable = false;
        self
    }

    /// Override the derived cache key. Only honored when the key stays
    /// under the path's resource prefix, e.g. `GET:/reports/...`.
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// What the transport actually sends for one attempt.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
    /// Stable across retries of the same logical call.
    pub request_id: Uuid,
}

impl OutgoingRequest {
    pub fn from_descriptor(descriptor: &RequestDescriptor, body: Option<Bytes>) -> Self {
        Self {
            method: descriptor.method,
            path: descriptor.path.clone(),
            query: descriptor.query.clone(),
            body,
            request_id: Uuid::new_v4(),
        }
    }
}
