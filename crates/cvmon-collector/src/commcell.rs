use crate::aggregate::health_metrics;
use crate::pipeline::{Pipeline, PipelineReport, PipelineState, RunContext};
use async_trait::async_trait;
use cvmon_api::commcell::{fetch_commcell_name, fetch_expiry_date, fetch_health, fetch_release};
use cvmon_api::ApiError;
use cvmon_common::MetricEntry;

pub const COMMCELL_NAME_KEY: &str = "key.commCellName";
pub const EXPIRY_DATE_KEY: &str = "key.expiryDate";
pub const RELEASE_KEY: &str = "key.release";

/// CommCell name, license expiry, release and health counters. The four
/// calls are independent of each other.
pub struct CommCellPipeline;

impl CommCellPipeline {
    fn collect(
        report: &mut PipelineReport,
        what: &str,
        result: Result<Vec<MetricEntry>, ApiError>,
    ) -> Vec<MetricEntry> {
        match result {
            Ok(entries) => entries,
            Err(e) => {
                report.note(format!("{what}: {e}"));
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Pipeline for CommCellPipeline {
    fn name(&self) -> &'static str {
        "commcell"
    }

    async fn run(&self, ctx: &RunContext<'_>) -> PipelineReport {
        let mut report = PipelineReport::new(self.name());
        let mut entries = Vec::new();

        let name = fetch_commcell_name(ctx.api)
            .await
            .map(|name| vec![MetricEntry::new(COMMCELL_NAME_KEY, name)]);
        entries.extend(Self::collect(&mut report, "commcell name", name));

        let expiry = fetch_expiry_date(ctx.api)
            .await
            .map(|date| vec![MetricEntry::new(EXPIRY_DATE_KEY, date)]);
        entries.extend(Self::collect(&mut report, "license", expiry));

        let release = fetch_release(ctx.api)
            .await
            .map(|release| vec![MetricEntry::new(RELEASE_KEY, release.to_string())]);
        entries.extend(Self::collect(&mut report, "release", release));

        let health = fetch_health(ctx.api, ctx.config)
            .await
            .map(|rows| health_metrics(&rows));
        entries.extend(Self::collect(&mut report, "health", health));

        if entries.is_empty() && !report.errors.is_empty() {
            report.state = PipelineState::Failed;
            tracing::error!(pipeline = self.name(), "Every CommCell call failed");
            return report;
        }
        report.absorb(ctx.sink.submit_batch(&entries).await);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use cvmon_api::commcell::{health_path, COMMSERV_PATH, LICENSE_PATH};
    use cvmon_api::mock::MockApi;
    use serde_json::json;

    fn healthy(config: &cvmon_api::ApiConfig) -> MockApi {
        MockApi::new()
            .with_json(
                COMMSERV_PATH,
                json!({
                    "commcell": {"commCellName": "cs-prod"},
                    "releaseName": "11.32",
                    "csVersionInfo": "SP32.45"
                }),
            )
            .with_json(LICENSE_PATH, json!({"expiryDate": "2027-01-31"}))
            .with_json(
                &health_path(config),
                json!({"records": [[1, "1_Good", 40], [2, "3_Warning", 3]]}),
            )
    }

    #[tokio::test]
    async fn submits_identity_and_present_health_buckets() {
        let harness = Harness::new(healthy);

        let report = CommCellPipeline.run(&harness.ctx()).await;

        assert!(report.is_success());
        assert_eq!(report.submitted, 5);
        assert_eq!(harness.sink.values_for(COMMCELL_NAME_KEY), vec!["cs-prod"]);
        assert_eq!(harness.sink.values_for(EXPIRY_DATE_KEY), vec!["2027-01-31"]);
        assert_eq!(harness.sink.values_for(RELEASE_KEY), vec!["11.32 | SP32.45"]);
        assert_eq!(harness.sink.values_for("key.health-good"), vec!["40"]);
        assert_eq!(harness.sink.values_for("key.health-warning"), vec!["3"]);
        assert!(harness.sink.values_for("key.health-critical").is_empty());
    }

    #[tokio::test]
    async fn one_failing_call_does_not_stop_the_others() {
        let harness = Harness::new(|config| healthy(config).with_status(LICENSE_PATH, 500));

        let report = CommCellPipeline.run(&harness.ctx()).await;

        assert_eq!(report.state, PipelineState::Done);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.submitted, 4);
        assert!(harness.sink.values_for(EXPIRY_DATE_KEY).is_empty());
    }

    #[tokio::test]
    async fn all_calls_failing_is_a_failure() {
        let harness = Harness::new(|_| MockApi::new());
        let report = CommCellPipeline.run(&harness.ctx()).await;
        assert_eq!(report.state, PipelineState::Failed);
        assert_eq!(report.errors.len(), 4);
    }
}
