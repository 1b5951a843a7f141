use crate::discovery::{build_discovery, media_agent_item};
use crate::keys::media_agent_status_key;
use crate::pipeline::{Pipeline, PipelineReport, RunContext};
use async_trait::async_trait;
use cvmon_api::media_agents::fetch_media_agents;
use cvmon_common::MetricEntry;
use cvmon_sink::submit_discovery;

/// `{#HOSTNAME}` discovery, then a fresh fetch for `status.ma[<name>]`.
pub struct MediaAgentPipeline;

#[async_trait]
impl Pipeline for MediaAgentPipeline {
    fn name(&self) -> &'static str {
        "media-agents"
    }

    async fn run(&self, ctx: &RunContext<'_>) -> PipelineReport {
        let agents = match fetch_media_agents(ctx.api).await {
            Ok(agents) if agents.is_empty() => return PipelineReport::empty(self.name()),
            Ok(agents) => agents,
            Err(e) => return PipelineReport::failed(self.name(), e),
        };

        let items = build_discovery(&agents, media_agent_item);
        if let Err(e) = submit_discovery(ctx.sink, &ctx.keys.media_agents, &items).await {
            return PipelineReport::failed(self.name(), e);
        }
        let mut report = PipelineReport::new(self.name());
        report.submitted += 1;

        let agents = match fetch_media_agents(ctx.api).await {
            Ok(agents) => agents,
            Err(e) => {
                report.fail(e);
                return report;
            }
        };
        let statuses: Vec<MetricEntry> = agents
            .iter()
            .map(|ma| MetricEntry::new(media_agent_status_key(&ma.display_name), &ma.status))
            .collect();
        report.absorb(ctx.sink.submit_batch(&statuses).await);
        report
    }
}
