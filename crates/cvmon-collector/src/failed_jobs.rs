use crate::discovery::{build_discovery, failed_job_item};
use crate::keys::job_status_key;
use crate::pipeline::{Pipeline, PipelineReport, RunContext};
use async_trait::async_trait;
use cvmon_api::jobs::fetch_failed_jobs;
use cvmon_common::MetricEntry;
use cvmon_sink::submit_discovery;

/// Discovery of failed and partially failed jobs, then one
/// `status.job[<id>]` value per job.
pub struct FailedJobsPipeline;

#[async_trait]
impl Pipeline for FailedJobsPipeline {
    fn name(&self) -> &'static str {
        "failed-jobs"
    }

    async fn run(&self, ctx: &RunContext<'_>) -> PipelineReport {
        let results = match fetch_failed_jobs(ctx.api, ctx.config).await {
            Ok(results) => results,
            Err(e) => return PipelineReport::failed(self.name(), e),
        };

        let mut report = PipelineReport::new(self.name());
        for e in &results.errors {
            report.note(e);
        }
        let jobs = results.records;
        if jobs.is_empty() {
            return PipelineReport {
                errors: report.errors,
                ..PipelineReport::empty(self.name())
            };
        }

        let items = build_discovery(&jobs, failed_job_item);
        if let Err(e) = submit_discovery(ctx.sink, ctx.keys.jobs_key(), &items).await {
            report.fail(e);
            return report;
        }
        report.submitted += 1;

        ctx.wait_for_discovery().await;

        let statuses: Vec<MetricEntry> = jobs
            .iter()
            .map(|job| MetricEntry::new(job_status_key(&job.id), &job.localized_status))
            .collect();
        report.absorb(ctx.sink.submit_batch(&statuses).await);
        report
    }
}
