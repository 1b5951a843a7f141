use crate::discovery::{build_discovery, library_item};
use crate::keys::library_metric_key;
use crate::pipeline::{Pipeline, PipelineReport, RunContext};
use async_trait::async_trait;
use cvmon_api::libraries::{fetch_libraries, fetch_library_details};
use cvmon_common::MetricEntry;
use cvmon_sink::submit_discovery;

/// `{#LIBRARYNAME}` discovery, then every `magLibSummary` value as
/// `<metric>.library[<name>]`.
pub struct LibraryPipeline;

#[async_trait]
impl Pipeline for LibraryPipeline {
    fn name(&self) -> &'static str {
        "libraries"
    }

    async fn run(&self, ctx: &RunContext<'_>) -> PipelineReport {
        let libraries = match fetch_libraries(ctx.api).await {
            Ok(libraries) if libraries.is_empty() => return PipelineReport::empty(self.name()),
            Ok(libraries) => libraries,
            Err(e) => return PipelineReport::failed(self.name(), e),
        };

        let items = build_discovery(&libraries, library_item);
        if let Err(e) = submit_discovery(ctx.sink, &ctx.keys.libraries, &items).await {
            return PipelineReport::failed(self.name(), e);
        }
        let mut report = PipelineReport::new(self.name());
        report.submitted += 1;

        ctx.wait_for_discovery().await;

        let libraries = match fetch_libraries(ctx.api).await {
            Ok(libraries) => libraries,
            Err(e) => {
                report.fail(e);
                return report;
            }
        };
        let details = fetch_library_details(ctx.api, &libraries).await;
        for e in &details.errors {
            report.note(e);
        }

        let metrics: Vec<MetricEntry> = details
            .records
            .iter()
            .flat_map(|detail| {
                detail
                    .summary
                    .iter()
                    .map(|(metric, value)| {
                        MetricEntry::new(library_metric_key(metric, &detail.name), value)
                    })
            })
            .collect();
        tracing::info!(
            pipeline = self.name(),
            libraries = details.records.len(),
            metrics = metrics.len(),
            "Library capacity collected"
        );
        report.absorb(ctx.sink.submit_batch(&metrics).await);
        report
    }
}
