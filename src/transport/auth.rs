//! Bearer token storage.
//!
//! The client never decides where tokens live; it asks a `TokenStore`. The
//! in-memory store is enough for services and the CLI; apps with secure
//! storage implement the trait themselves.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;

/// Source of access and refresh tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn access_token(&self) -> Option<String>;

    async fn set_access_token(&self, token: String);

    async fn clear_access_token(&self);

    async fn refresh_token(&self) -> Option<String>;

    async fn set_refresh_token(&self, token: String);

    /// Forget every token.
    async fn clear(&self);
}

/// Lock-free in-memory token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    access: ArcSwapOption<String>,
    refresh: ArcSwapOption<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::default();
        store.access.store(Some(Arc::new(token.into())));
        store
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access_token(&self) -> Option<String> {
        self.access
            .load_full()
            .map(|t| t.as_ref().clone())
            .filter(|t| !t.is_empty())
    }

    async fn set_access_token(&self, token: String) {
        self.access.store(Some(Arc::new(token)));
    }

    async fn clear_access_token(&self) {
        self.access.store(None);
    }

    async fn refresh_token(&self) -> Option<String> {
        self.refresh.load_full().map(|t| t.as_ref().clone())
    }

    async fn set_refresh_token(&self, token: String) {
        self.refresh.store(Some(Arc::new(token)));
    }

    async fn clear(&self) {
        self.access.store(None);
        self.refresh.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_lifecycle() {
        let store = MemoryTokenStore::new();
        assert!(store.access_token().await.is_none());

        store.set_access_token("abc".into()).await;
        store.set_refresh_token("def".into()).await;
        assert_eq!(store.access_token().await.as_deref(), Some("abc"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("def"));

        store.clear_access_token().await;
        assert!(store.access_token().await.is_none());
        assert_eq!(store.refresh_token().await.as_deref(), Some("def"));

        store.clear().await;
        assert!(store.refresh_token().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_token_is_absent() {
        let store = MemoryTokenStore::with_token("");
        assert!(store.access_token().await.is_none());
    }
}
