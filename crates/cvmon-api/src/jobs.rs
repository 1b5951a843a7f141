use crate::client::ApiSource;
use crate::error::Result;
use crate::{fetch_records, optional_array, required, string_at, ApiConfig, DetailResults};
use cvmon_common::sanitize_value;
use serde_json::Value;

/// Localized statuses that make a finished job worth discovering.
pub const FAILED_STATUSES: [&str; 2] = ["Failed", "Completed with one or more errors"];

/// Normalized `jobSummary` of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub status: String,
    pub localized_status: String,
    pub job_type: String,
    pub backup_level: String,
    pub client_name: String,
    pub instance_name: String,
    /// Already passed through the sanitizer.
    pub pending_reason: String,
}

impl Job {
    pub fn is_failed(&self) -> bool {
        FAILED_STATUSES.contains(&self.localized_status.as_str())
    }
}

/// Recent jobs, used for the status tally.
pub fn jobs_path(lookup_secs: u64) -> String {
    format!("/Job?completedJobLookupTime={lookup_secs}")
}

/// Finished backup and restore jobs, used for failed job discovery.
pub fn finished_jobs_path(lookup_secs: u64, limit: u32) -> String {
    format!(
        "/Job?completedJobLookupTime={lookup_secs}&jobCategory=Finished&jobFilter=backup,restore&limit={limit}"
    )
}

/// Project a job list response. A body without `jobs` means no jobs.
pub fn project_jobs(raw: &Value, endpoint: &str) -> Result<Vec<Job>> {
    optional_array(raw, "jobs")
        .iter()
        .map(|job| project_job(job, endpoint))
        .collect()
}

/// Like [`project_jobs`], but an entry without a usable `jobSummary` lands in
/// `errors` instead of failing the whole list.
pub fn project_jobs_isolated(raw: &Value, endpoint: &str) -> DetailResults<Job> {
    let mut results = DetailResults::default();
    for job in optional_array(raw, "jobs") {
        let projected = project_job(job, endpoint);
        if let Err(ref e) = projected {
            tracing::warn!(endpoint = %endpoint, error = %e, "Skipping job entry");
        }
        results.push(projected);
    }
    results
}

fn project_job(job: &Value, endpoint: &str) -> Result<Job> {
    let summary = required(job, "/jobSummary", endpoint)?;
    Ok(Job {
        id: string_at(summary, "/jobId"),
        status: string_at(summary, "/status"),
        localized_status: string_at(summary, "/localizedStatus"),
        job_type: string_at(summary, "/jobType"),
        backup_level: string_at(summary, "/backupLevelName"),
        client_name: string_at(summary, "/subclient/clientName"),
        instance_name: string_at(summary, "/subclient/instanceName"),
        pending_reason: sanitize_value(summary.get("pendingReason").unwrap_or(&Value::Null)),
    })
}

pub async fn fetch_jobs(api: &dyn ApiSource, config: &ApiConfig) -> Result<Vec<Job>> {
    fetch_records(api, &jobs_path(config.job_lookup_secs), project_jobs).await
}

/// Failed and partially failed jobs. Malformed entries are reported in
/// `errors` and the rest of the list is kept.
pub async fn fetch_failed_jobs(
    api: &dyn ApiSource,
    config: &ApiConfig,
) -> Result<DetailResults<Job>> {
    let path = finished_jobs_path(config.failed_job_lookup_secs, config.failed_job_limit);
    let raw = api.get_json(&path).await?;
    let mut results = project_jobs_isolated(&raw, &path);
    results.records.retain(Job::is_failed);
    tracing::debug!(
        endpoint = %path,
        failed = results.records.len(),
        skipped = results.errors.len(),
        "Fetched failed jobs"
    );
    Ok(results)
}
