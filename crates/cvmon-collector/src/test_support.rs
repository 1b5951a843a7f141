//! Shared fixtures for pipeline tests.

use crate::pipeline::RunContext;
use cvmon_api::mock::MockApi;
use cvmon_api::ApiConfig;
use cvmon_sink::{DiscoveryKeys, MemorySink};
use std::time::Duration;

pub(crate) struct Harness {
    pub api: MockApi,
    pub sink: MemorySink,
    pub config: ApiConfig,
    pub keys: DiscoveryKeys,
}

impl Harness {
    pub fn new(build: impl FnOnce(&ApiConfig) -> MockApi) -> Self {
        let config = ApiConfig::default();
        Self {
            api: build(&config),
            sink: MemorySink::new(),
            config,
            keys: DiscoveryKeys {
                jobs: Some("custom.discovery.jobs".to_string()),
                ..Default::default()
            },
        }
    }

    pub fn with_sink(mut self, sink: MemorySink) -> Self {
        self.sink = sink;
        self
    }

    pub fn ctx(&self) -> RunContext<'_> {
        RunContext {
            api: &self.api,
            sink: &self.sink,
            config: &self.config,
            keys: &self.keys,
            discovery_delay: Duration::ZERO,
        }
    }
}
