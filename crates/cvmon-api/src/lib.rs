//! CommServe REST API access.
//!
//! [`client::ApiSource`] is the seam every fetcher goes through; the
//! production implementation is [`client::CommvaultClient`]. Tests use
//! `mock::MockApi`, built with the `test-support` feature. Each entity module
//! projects the raw JSON into normalized records and returns `Ok(vec![])`
//! when the server legitimately reports nothing, so callers can tell an empty
//! inventory from a failure.

pub mod client;
pub mod clients;
pub mod commcell;
pub mod error;
pub mod jobs;
pub mod libraries;
pub mod media_agents;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use client::{ApiSource, CommvaultClient};
pub use error::{ApiError, Result};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Connection and query settings for the CommServe API.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server root, e.g. `https://commserve.example.com`.
    #[serde(default)]
    pub server_url: String,
    /// Value sent in the `Authtoken` header.
    #[serde(default)]
    pub api_token: String,
    /// Skip TLS certificate verification. Off unless explicitly enabled.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Window for the job status tally.
    #[serde(default = "default_job_lookup_secs")]
    pub job_lookup_secs: u64,
    /// Window for failed job discovery.
    #[serde(default = "default_failed_job_lookup_secs")]
    pub failed_job_lookup_secs: u64,
    #[serde(default = "default_failed_job_limit")]
    pub failed_job_limit: u32,
    /// Reports engine dataset backing the CommCell health report.
    #[serde(default = "default_health_dataset_id")]
    pub health_dataset_id: String,
    #[serde(default = "default_health_comm_uni_id")]
    pub health_comm_uni_id: u64,
}

fn default_job_lookup_secs() -> u64 {
    3600
}

fn default_failed_job_lookup_secs() -> u64 {
    14400
}

fn default_failed_job_limit() -> u32 {
    10000
}

fn default_health_dataset_id() -> String {
    "b50b20ed-5fc4-4b4c-f7c4-fc6b84eb35cc".to_string()
}

fn default_health_comm_uni_id() -> u64 {
    10000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            api_token: String::new(),
            accept_invalid_certs: false,
            job_lookup_secs: default_job_lookup_secs(),
            failed_job_lookup_secs: default_failed_job_lookup_secs(),
            failed_job_limit: default_failed_job_limit(),
            health_dataset_id: default_health_dataset_id(),
            health_comm_uni_id: default_health_comm_uni_id(),
        }
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("server_url", &self.server_url)
            .field("api_token", &"***")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("job_lookup_secs", &self.job_lookup_secs)
            .field("failed_job_lookup_secs", &self.failed_job_lookup_secs)
            .field("failed_job_limit", &self.failed_job_limit)
            .field("health_dataset_id", &self.health_dataset_id)
            .field("health_comm_uni_id", &self.health_comm_uni_id)
            .finish()
    }
}

/// Records resolved through one detail call per entity.
///
/// A failed detail call lands in `errors`; the remaining entities are still
/// resolved.
#[derive(Debug)]
pub struct DetailResults<T> {
    pub records: Vec<T>,
    pub errors: Vec<ApiError>,
}

// Written out so record types need not implement `Default`.
impl<T> Default for DetailResults<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> DetailResults<T> {
    pub fn push(&mut self, result: Result<T>) {
        match result {
            Ok(record) => self.records.push(record),
            Err(e) => self.errors.push(e),
        }
    }
}

/// Fetch one endpoint and project the body into records.
pub async fn fetch_records<T, F>(api: &dyn ApiSource, path: &str, project: F) -> Result<Vec<T>>
where
    F: FnOnce(&Value, &str) -> Result<Vec<T>>,
{
    let raw = api.get_json(path).await?;
    let records = project(&raw, path)?;
    tracing::debug!(endpoint = %path, count = records.len(), "Fetched records");
    Ok(records)
}

/// Look up a JSON pointer, failing with [`ApiError::Malformed`] when absent.
pub(crate) fn required<'a>(value: &'a Value, pointer: &str, endpoint: &str) -> Result<&'a Value> {
    match value.pointer(pointer) {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(ApiError::malformed(endpoint, pointer)),
    }
}

/// Like [`required`] but the target must be an array.
pub(crate) fn required_array<'a>(
    value: &'a Value,
    pointer: &str,
    endpoint: &str,
) -> Result<&'a Vec<Value>> {
    required(value, pointer, endpoint)?
        .as_array()
        .ok_or_else(|| ApiError::malformed(endpoint, pointer))
}

/// Array at `key`, or an empty slice when the key is missing.
pub(crate) fn optional_array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Render a scalar for forwarding: strings verbatim, `null` as empty.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// String field at `pointer`, empty when absent.
pub(crate) fn string_at(value: &Value, pointer: &str) -> String {
    value.pointer(pointer).map(scalar_to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_defaults_use_standard_lookup_windows() {
        let cfg = ApiConfig::default();
        assert_eq!(cfg.job_lookup_secs, 3600);
        assert_eq!(cfg.failed_job_lookup_secs, 14400);
        assert_eq!(cfg.failed_job_limit, 10000);
        assert!(!cfg.accept_invalid_certs);
    }

    #[test]
    fn config_debug_hides_token() {
        let cfg = ApiConfig {
            api_token: "QSDK supersecret".to_string(),
            ..Default::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("supersecret"));
    }

    #[test]
    fn required_reports_pointer_of_missing_field() {
        let raw = json!({"commcell": {}});
        let err = required(&raw, "/commcell/commCellName", "/CommServ").unwrap_err();
        assert!(matches!(
            err,
            ApiError::Malformed { ref field, .. } if field == "/commcell/commCellName"
        ));
    }

    #[test]
    fn scalars_render_without_quotes() {
        assert_eq!(scalar_to_string(&json!("Online")), "Online");
        assert_eq!(scalar_to_string(&json!(7)), "7");
        assert_eq!(scalar_to_string(&json!(null)), "");
    }

    #[test]
    fn detail_results_keep_successes_and_errors_apart() {
        let mut results = DetailResults::default();
        results.push(Ok(1));
        results.push(Err(ApiError::Config("boom".to_string())));
        results.push(Ok(3));
        assert_eq!(results.records, vec![1, 3]);
        assert_eq!(results.errors.len(), 1);
    }
}
