//! In-memory transport for unit tests: scripted responses per (method, path).

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};

type Key = (String, String);
type Scripted = Result<HttpResponse, String>;

/// Replays queued responses in FIFO order for each method + URL path (query ignored).
/// A request with nothing queued fails like an unreachable server.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<HashMap<Key, VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: &str, path: &str, r: Scripted) {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(r);
    }

    pub(crate) fn push_json(&self, method: &str, path: &str, status: u32, body: Value) {
        self.push(
            method,
            path,
            Ok(HttpResponse {
                status,
                body: serde_json::to_vec(&body).unwrap(),
            }),
        );
    }

    pub(crate) fn push_empty(&self, method: &str, path: &str, status: u32) {
        self.push(
            method,
            path,
            Ok(HttpResponse {
                status,
                body: Vec::new(),
            }),
        );
    }

    pub(crate) fn push_transport_error(&self, method: &str, path: &str, message: &str) {
        self.push(method, path, Err(message.to_string()));
    }

    /// Every request seen so far, in order.
    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests seen for a method + path.
    pub(crate) fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method.as_str() == method && r.url.path() == path)
            .count()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let key = (
            request.method.as_str().to_string(),
            request.url.path().to_string(),
        );
        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Ok(resp)) => Ok(resp),
            Some(Err(msg)) => Err(TransportError(msg)),
            None => Err(TransportError(format!(
                "no scripted response for {} {}",
                key.0, key.1
            ))),
        }
    }
}

impl HttpRequest {
    /// Decoded JSON body (test helper).
    pub(crate) fn body_json(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}
