use async_trait::async_trait;
use cvmon_api::{ApiConfig, ApiSource};
use cvmon_sink::{BatchReport, DiscoveryKeys, MetricSink};
use std::fmt;
use std::time::Duration;

/// Everything a pipeline needs for one pass. Borrowed from the runner.
pub struct RunContext<'a> {
    pub api: &'a dyn ApiSource,
    pub sink: &'a dyn MetricSink,
    pub config: &'a ApiConfig,
    pub keys: &'a DiscoveryKeys,
    /// Pause between a discovery submission and the matching status values.
    pub discovery_delay: Duration,
}

impl RunContext<'_> {
    pub(crate) async fn wait_for_discovery(&self) {
        if !self.discovery_delay.is_zero() {
            tracing::debug!(delay = ?self.discovery_delay, "Waiting for discovery to settle");
            tokio::time::sleep(self.discovery_delay).await;
        }
    }
}

/// One fetch, classify and submit pass for one entity type.
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Returns the pipeline name used on the command line (e.g., `"jobs"`).
    fn name(&self) -> &'static str;

    /// Runs the pipeline. Errors are caught and folded into the report.
    async fn run(&self, ctx: &RunContext<'_>) -> PipelineReport;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// The server reported no entities; nothing was submitted.
    Empty,
    /// The pipeline could not complete.
    Failed,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineState::Empty => "empty",
            PipelineState::Failed => "failed",
            PipelineState::Done => "done",
        })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub pipeline: &'static str,
    pub state: PipelineState,
    /// Entries accepted by the sink.
    pub submitted: usize,
    /// Entries the sink rejected.
    pub rejected: usize,
    pub errors: Vec<String>,
}

impl PipelineReport {
    pub fn new(pipeline: &'static str) -> Self {
        Self {
            pipeline,
            state: PipelineState::Done,
            submitted: 0,
            rejected: 0,
            errors: Vec::new(),
        }
    }

    pub fn empty(pipeline: &'static str) -> Self {
        tracing::info!(pipeline, "Nothing to submit");
        Self {
            state: PipelineState::Empty,
            ..Self::new(pipeline)
        }
    }

    pub fn failed(pipeline: &'static str, error: impl fmt::Display) -> Self {
        let mut report = Self::new(pipeline);
        report.fail(error);
        report
    }

    /// Mark the pipeline failed, keeping whatever was already submitted.
    pub fn fail(&mut self, error: impl fmt::Display) {
        tracing::error!(pipeline = self.pipeline, error = %error, "Pipeline failed");
        self.state = PipelineState::Failed;
        self.errors.push(error.to_string());
    }

    /// Record an error that did not stop the pipeline.
    pub fn note(&mut self, error: impl fmt::Display) {
        tracing::warn!(pipeline = self.pipeline, error = %error, "Partial failure");
        self.errors.push(error.to_string());
    }

    pub fn absorb(&mut self, batch: BatchReport) {
        self.submitted += batch.submitted;
        self.rejected += batch.failed();
    }

    pub fn is_success(&self) -> bool {
        self.state != PipelineState::Failed && self.rejected == 0 && self.errors.is_empty()
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (submitted={}, rejected={}, errors={})",
            self.pipeline,
            self.state,
            self.submitted,
            self.rejected,
            self.errors.len()
        )
    }
}
