//! In-memory [`Transport`] for tests.
//!
//! Replies are scripted per `(method, path)`. Queued replies are consumed in
//! order and the last one keeps answering, so a single `reply` scripts an
//! endpoint for the whole test. Unscripted endpoints answer 404.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use newsdesk_core::{NewsdeskError, Result};

use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

#[derive(Debug, Clone)]
enum Scripted {
    Response(ApiResponse),
    Failure(NewsdeskError),
}

type RouteKey = (Method, String);

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<RouteKey, VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request waits `latency` before it is answered.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        if let Ok(mut routes) = self.routes.lock() {
            routes
                .entry((method, path.to_string()))
                .or_default()
                .push_back(scripted);
        }
    }

    pub fn reply(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.push(
            method,
            path,
            Scripted::Response(ApiResponse::json_value(status, &body)),
        );
    }

    /// Scripts a reply with an empty body.
    pub fn reply_empty(&self, method: Method, path: &str, status: u16) {
        self.push(method, path, Scripted::Response(ApiResponse::new(status, Vec::new())));
    }

    /// Scripts a transport-level failure (no HTTP response).
    pub fn fail(&self, method: Method, path: &str, err: NewsdeskError) {
        self.push(method, path, Scripted::Failure(err));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last_request(&self, method: Method, path: &str) -> Option<ApiRequest> {
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
    }

    fn next_reply(&self, method: Method, path: &str) -> Scripted {
        let Ok(mut routes) = self.routes.lock() else {
            return Scripted::Failure(NewsdeskError::internal("scripted transport poisoned"));
        };
        match routes.get_mut(&(method, path.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(not_found),
            Some(queue) => queue.front().cloned().unwrap_or_else(not_found),
            None => not_found(),
        }
    }
}

fn not_found() -> Scripted {
    Scripted::Response(ApiResponse::json_value(
        404,
        &serde_json::json!({"detail": "Not found."}),
    ))
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.next_reply(request.method, &request.path) {
            Scripted::Response(response) => Ok(response),
            Scripted::Failure(err) => Err(err),
        }
    }
}
