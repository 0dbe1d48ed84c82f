//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::transport::{Method, OutgoingRequest, RawResponse, Transport};

/// One recorded call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    pub request_id: uuid::Uuid,
    pub at: tokio::time::Instant,
}

type Scripted = (Option<Duration>, Result<RawResponse, ApiError>);

/// Replays queued outcomes in order, then falls back to a default.
///
/// Each call takes its outcome when it arrives, so a slow scripted reply
/// does not hold up the calls queued behind it.
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Result<RawResponse, ApiError>,
    latency: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(RawResponse::new(200, "{}")),
            latency: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call answers with this outcome once the script is drained.
    pub fn always(outcome: Result<RawResponse, ApiError>) -> Self {
        Self {
            fallback: outcome,
            ..Self::new()
        }
    }

    pub fn then(self, outcome: Result<RawResponse, ApiError>) -> Self {
        self.script.lock().unwrap().push_back((None, outcome));
        self
    }

    /// Queue an outcome delivered `delay` after the call arrives.
    pub fn then_after(self, delay: Duration, outcome: Result<RawResponse, ApiError>) -> Self {
        self.script.lock().unwrap().push_back((Some(delay), outcome));
        self
    }

    pub fn then_status(self, status: u16) -> Self {
        self.then(Ok(RawResponse::new(status, "")))
    }

    pub fn then_json(self, status: u16, body: &str) -> Self {
        self.then(Ok(RawResponse::new(status, body.to_string())))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &OutgoingRequest) -> Result<RawResponse, ApiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.method,
            path: request.path.clone(),
            query: request.query.clone(),
            body: request
                .body
                .as_ref()
                .map(|b| String::from_utf8_lossy(b).into_owned()),
            request_id: request.request_id,
            at: tokio::time::Instant::now(),
        });

        let next = self.script.lock().unwrap().pop_front();
        let (delay, outcome) = next.unwrap_or_else(|| (None, self.fallback.clone()));

        if let Some(latency) = delay.or(self.latency) {
            tokio::time::sleep(latency).await;
        }
        outcome
    }
}
