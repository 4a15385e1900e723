//! Test helpers shared by the unit tests of this crate

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::api::{Method, Transport};
use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A request seen by [`FakeTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
}

/// In-memory transport with canned replies keyed by endpoint path.
///
/// The query string is ignored when matching. Unrouted endpoints fail with a
/// transport error.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, std::result::Result<Value, TransportError>>>,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, endpoint: &str, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Ok(body));
    }

    pub fn fail(&self, endpoint: &str, message: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Err(TransportError::new(message)));
    }

    /// Make calls to `endpoint` wait until the returned handle is notified.
    pub fn hold(&self, endpoint: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| path_of(&c.endpoint) == endpoint)
            .count()
    }
}

fn path_of(endpoint: &str) -> &str {
    endpoint.split('?').next().unwrap_or(endpoint)
}

#[async_trait]
impl Transport for FakeTransport {
    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> std::result::Result<Value, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            endpoint: endpoint.to_string(),
            body,
        });

        let path = path_of(endpoint);
        let hold = self.holds.lock().unwrap().get(path).cloned();
        if let Some(notify) = hold {
            notify.notified().await;
        }

        self.routes
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::new(format!("no route for {}", path))))
    }
}
