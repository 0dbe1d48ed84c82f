//! The API client: one entry point composing retry, cache and transport.
//!
//! # Data Flow
//! ```text
//! ApiClient::request(descriptor, body, options)
//!     → cache lookup (cacheable reads only) → hit: return, zero attempts
//!     → Retrier::run
//!         → with_timeout(Transport::send)       one attempt
//!         → non-2xx → ApiError::Http            classified here
//!     → 2xx cacheable read → cache set
//!     → any write → invalidate GET:/<resource>
//!     → decode JSON into T
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::cache::{key_for, resource_prefix, ResponseCache};
use crate::config::{validate_config, ClientConfig, ConfigError};
use crate::error::{ApiError, ApiResult, ClientError};
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;
use crate::resilience::{CallOptions, CancelScope, Retrier, RetryCondition, RetryPolicy};
use crate::services::{
    AccountsService, AuthService, BudgetsService, CategoriesService, GoalsService, ReportsService,
    TransactionsService,
};
use crate::transport::{
    HttpTransport, MemoryTokenStore, OutgoingRequest, RawResponse, RequestDescriptor, TokenStore,
    Transport,
};

/// A decoded response and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    pub value: T,
    /// Transport attempts made; zero when served from cache.
    pub attempts: u32,
    pub from_cache: bool,
}

impl<T> Response<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Builder for [`ApiClient`].
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    tokens: Option<Arc<dyn TokenStore>>,
    retry_condition: Option<RetryCondition>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            tokens: None,
            retry_condition: None,
        }
    }

    /// Use a custom transport instead of the reqwest one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Replace the default retry classification.
    pub fn retry_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&ApiError) -> bool + Send + Sync + 'static,
    {
        self.retry_condition = Some(Arc::new(condition));
        self
    }

    pub fn build(self) -> Result<ApiClient, ConfigError> {
        validate_config(&self.config).map_err(ConfigError::Validation)?;
        let config = self.config;

        let tokens: Arc<dyn TokenStore> = self
            .tokens
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::new(&config, tokens.clone())
                    .map_err(|e| ConfigError::Transport(e.to_string()))?,
            ),
        };

        let cache = config
            .cache
            .enabled
            .then(|| ResponseCache::new(config.cache.default_ttl()));

        let sweeper = match &cache {
            Some(cache) if config.cache.cleanup_interval_ms > 0 => {
                if tokio::runtime::Handle::try_current().is_ok() {
                    Some(cache.spawn_cleanup(Duration::from_millis(config.cache.cleanup_interval_ms)))
                } else {
                    tracing::debug!("No Tokio runtime at build time, cache cleanup task not started");
                    None
                }
            }
            _ => None,
        };

        let mut retrier = Retrier::new(RetryPolicy::from(&config.retry));
        if let Some(condition) = self.retry_condition {
            retrier = retrier.with_condition(condition);
        }

        tracing::debug!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            max_attempts = retrier.policy().max_attempts,
            cache_enabled = cache.is_some(),
            "API client built"
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                transport,
                tokens,
                cache,
                retrier,
                timeout: config.timeout(),
                clear_token_on_unauthorized: config.clear_token_on_unauthorized,
                sweeper,
            }),
        })
    }
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    cache: Option<ResponseCache>,
    retrier: Retrier,
    timeout: Duration,
    clear_token_on_unauthorized: bool,
    sweeper: Option<JoinHandle<()>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

/// Typed, resilient client for the Fayol API. Clones share state.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Build a client with the reqwest transport and an in-memory token store.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        ClientBuilder::new(config).build()
    }

    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    // --- Entry points ---

    /// Perform a call without a body and decode the JSON response.
    pub async fn request<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
        options: &CallOptions,
    ) -> ApiResult<Response<T>> {
        let raw = self.execute(descriptor, None, options).await?;
        decode(raw)
    }

    /// Perform a call with a JSON body and decode the JSON response.
    pub async fn request_with_body<B, T>(
        &self,
        descriptor: &RequestDescriptor,
        body: &B,
        options: &CallOptions,
    ) -> ApiResult<Response<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_vec(body)
            .map(Bytes::from)
            .map_err(|e| ClientError::new(ApiError::InvalidRequest(e.to_string()), 0))?;
        let raw = self.execute(descriptor, Some(body), options).await?;
        decode(raw)
    }

    /// Perform a call and return the undecoded body.
    pub async fn request_raw(
        &self,
        descriptor: &RequestDescriptor,
        body: Option<Bytes>,
        options: &CallOptions,
    ) -> ApiResult<Response<Bytes>> {
        self.execute(descriptor, body, options).await
    }

    /// `GET path` with default options.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.fetch(&RequestDescriptor::get(path)).await
    }

    /// Bodiless call with default options.
    pub async fn fetch<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> ApiResult<T> {
        self.request(descriptor, &CallOptions::default())
            .await
            .map(Response::into_inner)
    }

    /// Call with a JSON body and default options.
    pub async fn send_json<B, T>(&self, descriptor: &RequestDescriptor, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_with_body(descriptor, body, &CallOptions::default())
            .await
            .map(Response::into_inner)
    }

    async fn execute(
        &self,
        descriptor: &RequestDescriptor,
        body: Option<Bytes>,
        options: &CallOptions,
    ) -> ApiResult<Response<Bytes>> {
        let start = Instant::now();
        let method = descriptor.method.as_str();
        let inner = &self.inner;

        let cache = inner.cache.as_ref().filter(|_| descriptor.cacheable);
        let cache_key = cache.map(|_| key_for(descriptor));

        if let (Some(cache), Some(key)) = (cache, cache_key.as_deref()) {
            if let Some(body) = cache.get(key) {
                tracing::debug!(key, "Cache hit");
                metrics::record_cache_hit();
                metrics::record_request(method, "cache_hit", start);
                return Ok(Response {
                    value: body,
                    attempts: 0,
                    from_cache: true,
                });
            }
            metrics::record_cache_miss();
        }

        // Reads that overlap an invalidation must not repopulate the cache
        let generation = cache.map(|cache| cache.generation());
        let outgoing = OutgoingRequest::from_descriptor(descriptor, body);
        let timeout = descriptor.timeout.unwrap_or(inner.timeout);
        let scope = CancelScope::new(options);
        let transport = &inner.transport;

        let result = inner
            .retrier
            .run(method, descriptor.idempotent, &scope, |attempt| {
                let outgoing = &outgoing;
                async move {
                    tracing::debug!(
                        request_id = %outgoing.request_id,
                        method = %outgoing.method,
                        path = %outgoing.path,
                        attempt,
                        "Sending request"
                    );
                    let raw = with_timeout(timeout, transport.send(outgoing)).await?;
                    classify(raw)
                }
            })
            .await;

        let attempts = match &result {
            Ok(done) => done.attempts,
            Err(err) => err.attempts,
        };

        // A write that reached the server may have applied even if it failed
        if !descriptor.method.is_read() && attempts > 0 {
            self.invalidate_resource(&descriptor.path);
        }

        match result {
            Ok(done) => {
                if let (Some(cache), Some(key), Some(since)) = (cache, cache_key, generation) {
                    let ttl = descriptor.cache_ttl.unwrap_or(cache.default_ttl());
                    if !cache.set_if_current(key, done.value.body.clone(), ttl, since) {
                        tracing::debug!(path = %descriptor.path, "Cache invalidated mid-flight, not storing response");
                    }
                }
                metrics::record_request(method, "ok", start);
                Ok(Response {
                    value: done.value.body,
                    attempts: done.attempts,
                    from_cache: false,
                })
            }
            Err(err) => {
                if err.status() == Some(401) && inner.clear_token_on_unauthorized {
                    tracing::warn!(path = %descriptor.path, "Unauthorized, clearing access token");
                    inner.tokens.clear_access_token().await;
                    self.clear_cache();
                }
                tracing::debug!(
                    request_id = %outgoing.request_id,
                    path = %descriptor.path,
                    attempts = err.attempts,
                    error = %err.kind,
                    "Request failed"
                );
                metrics::record_request(method, metrics::outcome_label(&err.kind), start);
                Err(err)
            }
        }
    }

    // --- Cache control ---

    /// Drop cached reads of the resource a path belongs to.
    pub fn invalidate_resource(&self, path: &str) -> usize {
        let Some(cache) = &self.inner.cache else {
            return 0;
        };
        let prefix = resource_prefix(path);
        let removed = cache.invalidate(&prefix);
        if removed > 0 {
            tracing::debug!(prefix = %prefix, removed, "Invalidated cached reads");
        }
        removed
    }

    /// Drop every cached read whose key contains `pattern`.
    pub fn invalidate_cache(&self, pattern: &str) -> usize {
        self.inner
            .cache
            .as_ref()
            .map_or(0, |cache| cache.invalidate_matching(pattern))
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.clear();
        }
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.inner.cache.as_ref()
    }

    // --- Tokens ---

    /// Store the access token. Switching to a different token drops the
    /// cache, since cached reads belong to whoever made them.
    pub async fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        let changed = self.token().await.as_deref() != Some(token.as_str());
        self.inner.tokens.set_access_token(token).await;
        if changed {
            tracing::debug!("Access token changed, clearing cache");
            self.clear_cache();
        }
    }

    pub async fn set_refresh_token(&self, token: impl Into<String>) {
        self.inner.tokens.set_refresh_token(token.into()).await;
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.tokens.access_token().await
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.inner.tokens.refresh_token().await
    }

    /// Forget all tokens and every cached read made with them.
    pub async fn clear_token(&self) {
        self.inner.tokens.clear().await;
        self.clear_cache();
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token().await.is_some()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.inner.retrier.policy()
    }

    // --- Typed services ---

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.clone())
    }

    pub fn accounts(&self) -> AccountsService {
        AccountsService::new(self.clone(), "/accounts")
    }

    pub fn transactions(&self) -> TransactionsService {
        TransactionsService::new(self.clone(), "/transactions")
    }

    pub fn categories(&self) -> CategoriesService {
        CategoriesService::new(self.clone(), "/categories")
    }

    pub fn budgets(&self) -> BudgetsService {
        BudgetsService::new(self.clone(), "/budgets")
    }

    pub fn goals(&self) -> GoalsService {
        GoalsService::new(self.clone(), "/goals")
    }

    pub fn reports(&self) -> ReportsService {
        ReportsService::new(self.clone())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("timeout", &self.inner.timeout)
            .field("retrier", &self.inner.retrier)
            .field("cache_entries", &self.inner.cache.as_ref().map(|c| c.len()))
            .finish()
    }
}

/// Turn a non-2xx response into `ApiError::Http`.
fn classify(raw: RawResponse) -> Result<RawResponse, ApiError> {
    if raw.is_success() {
        return Ok(raw);
    }
    Err(ApiError::Http {
        status: raw.status,
        retry_after: raw.retry_after(),
        body: raw.body_text(),
    })
}

fn decode<T: DeserializeOwned>(raw: Response<Bytes>) -> ApiResult<Response<T>> {
    let body: &[u8] = if raw.value.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &raw.value
    };
    match serde_json::from_slice(body) {
        Ok(value) => Ok(Response {
            value,
            attempts: raw.attempts,
            from_cache: raw.from_cache,
        }),
        Err(e) => Err(ClientError::new(
            ApiError::Validation(e.to_string()),
            raw.attempts,
        )),
    }
}
