use crate::aggregate::aggregate_job_status;
use crate::pipeline::{Pipeline, PipelineReport, RunContext};
use async_trait::async_trait;
use cvmon_api::jobs::fetch_jobs;

/// Six `commvault.<status>_jobs` counters over the lookup window.
pub struct JobSummaryPipeline;

#[async_trait]
impl Pipeline for JobSummaryPipeline {
    fn name(&self) -> &'static str {
        "jobs"
    }

    async fn run(&self, ctx: &RunContext<'_>) -> PipelineReport {
        let jobs = match fetch_jobs(ctx.api, ctx.config).await {
            Ok(jobs) if jobs.is_empty() => return PipelineReport::empty(self.name()),
            Ok(jobs) => jobs,
            Err(e) => return PipelineReport::failed(self.name(), e),
        };

        let counts = aggregate_job_status(&jobs);
        tracing::info!(
            pipeline = self.name(),
            jobs = jobs.len(),
            tallied = counts.total(),
            "Jobs tallied"
        );

        let mut report = PipelineReport::new(self.name());
        report.absorb(ctx.sink.submit_batch(&counts.to_metrics()).await);
        report
    }
}
