//! In-memory [`ApiSource`] with canned responses per path.

use crate::client::ApiSource;
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockApi {
    responses: HashMap<String, Value>,
    statuses: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with `body`.
    pub fn with_json(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), body);
        self
    }

    /// Answer `path` with a non-2xx status.
    pub fn with_status(mut self, path: &str, status: u16) -> Self {
        self.statuses.insert(path.to_string(), status);
        self
    }

    /// Paths requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl ApiSource for MockApi {
    async fn get_json(&self, path: &str) -> Result<Value> {
        match self.calls.lock() {
            Ok(mut calls) => calls.push(path.to_string()),
            Err(poisoned) => poisoned.into_inner().push(path.to_string()),
        }

        if let Some(status) = self.statuses.get(path) {
            return Err(ApiError::HttpStatus {
                endpoint: path.to_string(),
                status: *status,
                body: String::new(),
            });
        }

        self.responses
            .get(path)
            .cloned()
            .ok_or_else(|| ApiError::HttpStatus {
                endpoint: path.to_string(),
                status: 404,
                body: "no canned response".to_string(),
            })
    }
}
