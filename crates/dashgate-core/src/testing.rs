//! In-memory [`Backend`] fake for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde_json::Value;

use crate::api::{ApiError, ApiResult, Backend};

/// One request seen by [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Replays scripted responses per `(method, path)` and records every call.
///
/// Unscripted requests fail with HTTP 404.
#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<HashMap<(&'static str, String), VecDeque<ApiResult<Value>>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, method: &'static str, path: &str, response: ApiResult<Value>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    pub fn ok(self, method: &'static str, path: &str, body: Value) -> Self {
        self.respond(method, path, Ok(body))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }

    fn handle(
        &self,
        method: &'static str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
            body: body.cloned(),
        });

        self.responses
            .lock()
            .unwrap()
            .get_mut(&(method, path.to_string()))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(ApiError::http_status(404, r#"{"message":"Not found"}"#)))
    }
}

impl Backend for ScriptedBackend {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        self.handle("GET", path, query, None)
    }

    async fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.handle("POST", path, &[], Some(body))
    }

    async fn put(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.handle("PUT", path, &[], Some(body))
    }
}
