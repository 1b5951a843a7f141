use chrono::{DateTime, Utc};
use cvmon_collector::{Pipeline, PipelineReport, PipelineState, RunContext};

/// Outcome of one pass over the selected pipelines.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pipelines: Vec<PipelineReport>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.pipelines.iter().all(PipelineReport::is_success)
    }

    pub fn count(&self, state: PipelineState) -> usize {
        self.pipelines.iter().filter(|r| r.state == state).count()
    }

    pub fn submitted(&self) -> usize {
        self.pipelines.iter().map(|r| r.submitted).sum()
    }

    pub fn exit_code(&self, legacy_exit_zero: bool) -> i32 {
        if legacy_exit_zero || self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Run pipelines one after another. A failing pipeline never stops the
/// ones after it.
pub async fn run_pipelines(pipelines: &[Box<dyn Pipeline>], ctx: &RunContext<'_>) -> RunReport {
    let started_at = Utc::now();
    let mut reports = Vec::with_capacity(pipelines.len());

    for pipeline in pipelines {
        tracing::info!(pipeline = pipeline.name(), "Pipeline starting");
        let report = pipeline.run(ctx).await;
        tracing::info!(
            pipeline = report.pipeline,
            state = %report.state,
            submitted = report.submitted,
            rejected = report.rejected,
            errors = report.errors.len(),
            "Pipeline finished"
        );
        reports.push(report);
    }

    let report = RunReport {
        started_at,
        finished_at: Utc::now(),
        pipelines: reports,
    };
    tracing::info!(
        done = report.count(PipelineState::Done),
        empty = report.count(PipelineState::Empty),
        failed = report.count(PipelineState::Failed),
        submitted = report.submitted(),
        elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
        "Run complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvmon_api::jobs::jobs_path;
    use cvmon_api::mock::MockApi;
    use cvmon_api::ApiConfig;
    use cvmon_collector::{all_pipelines, select_pipelines};
    use cvmon_sink::{DiscoveryKeys, MemorySink};
    use serde_json::json;
    use std::time::Duration;

    fn ctx<'a>(
        api: &'a MockApi,
        sink: &'a MemorySink,
        config: &'a ApiConfig,
        keys: &'a DiscoveryKeys,
    ) -> RunContext<'a> {
        RunContext {
            api,
            sink,
            config,
            keys,
            discovery_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn every_pipeline_runs_even_when_all_fail() {
        let (api, sink, config, keys) = (
            MockApi::new(),
            MemorySink::new(),
            ApiConfig::default(),
            DiscoveryKeys::default(),
        );

        let report = run_pipelines(&all_pipelines(), &ctx(&api, &sink, &config, &keys)).await;

        assert_eq!(report.pipelines.len(), 5);
        assert_eq!(report.count(PipelineState::Failed), 5);
        assert!(!report.is_success());
        assert_eq!(report.exit_code(false), 1);
        assert_eq!(report.exit_code(true), 0);
    }

    #[tokio::test]
    async fn successful_selection_exits_zero() {
        let config = ApiConfig::default();
        let api = MockApi::new().with_json(
            &jobs_path(config.job_lookup_secs),
            json!({"jobs": [{"jobSummary": {"jobId": 1, "status": "Completed"}}]}),
        );
        let (sink, keys) = (MemorySink::new(), DiscoveryKeys::default());
        let pipelines = select_pipelines(&["jobs".to_string()]).unwrap();

        let report = run_pipelines(&pipelines, &ctx(&api, &sink, &config, &keys)).await;

        assert!(report.is_success());
        assert_eq!(report.submitted(), 6);
        assert_eq!(report.exit_code(false), 0);
    }

    #[tokio::test]
    async fn rejected_submission_fails_the_run() {
        let config = ApiConfig::default();
        let api = MockApi::new().with_json(
            &jobs_path(config.job_lookup_secs),
            json!({"jobs": [{"jobSummary": {"jobId": 1, "status": "Failed"}}]}),
        );
        let sink = MemorySink::new().fail_key("commvault.failed_jobs");
        let keys = DiscoveryKeys::default();
        let pipelines = select_pipelines(&["jobs".to_string()]).unwrap();

        let report = run_pipelines(&pipelines, &ctx(&api, &sink, &config, &keys)).await;

        assert_eq!(report.count(PipelineState::Done), 1);
        assert_eq!(report.exit_code(false), 1);
    }
}
