use cvmon_api::commcell::HealthRow;
use cvmon_api::jobs::Job;
use cvmon_api::scalar_to_string;
use cvmon_common::{AggregateCounts, HealthBucket, JobStatus, MetricEntry};
use serde_json::Value;
use std::collections::BTreeMap;

/// Tally jobs by status in one pass. Statuses outside [`JobStatus`] are
/// dropped.
pub fn aggregate_job_status(jobs: &[Job]) -> AggregateCounts {
    let mut counts = AggregateCounts::new();
    for job in jobs {
        match job.status.parse::<JobStatus>() {
            Ok(status) => counts.record(status),
            Err(_) => tracing::trace!(job_id = %job.id, status = %job.status, "Status not tallied"),
        }
    }
    counts
}

/// Health buckets present in the report. A repeated tag keeps the last row.
pub fn bucket_health(rows: &[HealthRow]) -> Vec<(HealthBucket, Value)> {
    let mut buckets = BTreeMap::new();
    for row in rows {
        if let Some(bucket) = HealthBucket::from_tag(&row.label) {
            buckets.insert(bucket, row.count.clone());
        }
    }
    buckets.into_iter().collect()
}

pub fn health_metrics(rows: &[HealthRow]) -> Vec<MetricEntry> {
    bucket_health(rows)
        .into_iter()
        .map(|(bucket, count)| MetricEntry::new(bucket.metric_key(), scalar_to_string(&count)))
        .collect()
}
