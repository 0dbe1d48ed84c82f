//! Cache key derivation.
//!
//! Keys look like `GET:/accounts/7?limit=10&page=2`. The same rule produces
//! the resource prefix a write invalidates (`GET:/accounts`), so reads and
//! invalidations can never disagree about what a resource's keys are.

use crate::transport::{Method, RequestDescriptor};

/// Collapse duplicate slashes, force a leading slash, drop a trailing one.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Deterministic key for method + path + query, independent of query order.
pub fn derive_key(method: Method, path: &str, query: &[(String, String)]) -> String {
    let mut key = format!("{}:{}", method.as_str(), normalize_path(path));
    if !query.is_empty() {
        let mut pairs: Vec<(&str, &str)> = query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        key.push('?');
        key.push_str(&encoded);
    }
    key
}

/// Key for a descriptor, honoring an explicit override.
///
/// An override must stay under the resource prefix of the descriptor's path,
/// otherwise writes to that resource could never invalidate it. Overrides
/// outside it are ignored in favor of the derived key.
pub fn key_for(descriptor: &RequestDescriptor) -> String {
    let derived = || derive_key(descriptor.method, &descriptor.path, &descriptor.query);
    match &descriptor.cache_key {
        Some(key) if extends_prefix(key, &resource_prefix(&descriptor.path)) => key.clone(),
        Some(key) => {
            tracing::warn!(
                key = %key,
                path = %descriptor.path,
                "Cache key override lies outside its resource, using derived key"
            );
            derived()
        }
        None => derived(),
    }
}

/// Read-key prefix covering every cached read of the resource `path` touches.
pub fn resource_prefix(path: &str) -> String {
    let normalized = normalize_path(path);
    let resource = normalized
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();
    format!("{}:/{}", Method::Get.as_str(), resource)
}

/// True when `key` is `prefix` itself or continues it at a `/` or `?` boundary.
pub fn extends_prefix(key: &str, prefix: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some(rest) => {
            rest.is_empty()
                || prefix.ends_with('/')
                || prefix.ends_with('?')
                || rest.starts_with('/')
                || rest.starts_with('?')
        }
        None => false,
    }
}
