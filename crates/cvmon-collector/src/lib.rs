//! Classification and per-entity pipelines.
//!
//! Each [`Pipeline`] fetches one entity type through the API, classifies the
//! records and hands the resulting metrics to a sink. Pipelines never return
//! errors; every failure ends up in the [`PipelineReport`].

pub mod aggregate;
pub mod commcell;
pub mod discovery;
pub mod failed_jobs;
pub mod jobs;
pub mod keys;
pub mod libraries;
pub mod media_agents;
pub mod pipeline;

#[cfg(test)]
mod test_support;

pub use pipeline::{Pipeline, PipelineReport, PipelineState, RunContext};

/// Every pipeline in run order. Discovery-backed pipelines come after the
/// plain job tally.
pub fn all_pipelines() -> Vec<Box<dyn Pipeline>> {
    vec![
        Box::new(jobs::JobSummaryPipeline),
        Box::new(failed_jobs::FailedJobsPipeline),
        Box::new(media_agents::MediaAgentPipeline),
        Box::new(libraries::LibraryPipeline),
        Box::new(commcell::CommCellPipeline),
    ]
}

/// Pipelines matching `names`, in run order. No names, or `all`, selects
/// every pipeline. Unknown names are returned as the error.
pub fn select_pipelines(names: &[String]) -> Result<Vec<Box<dyn Pipeline>>, Vec<String>> {
    let all = all_pipelines();
    let unknown: Vec<String> = names
        .iter()
        .filter(|name| *name != "all" && !all.iter().any(|p| p.name() == name.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(unknown);
    }
    if names.is_empty() || names.iter().any(|n| n == "all") {
        return Ok(all);
    }
    Ok(all
        .into_iter()
        .filter(|p| names.iter().any(|n| n == p.name()))
        .collect())
}
