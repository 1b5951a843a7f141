use crate::error::{Result, SinkError};
use crate::MetricSink;
use async_trait::async_trait;
use cvmon_common::MetricEntry;
use std::collections::HashSet;
use std::sync::Mutex;

/// Sink that keeps accepted entries in memory.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<MetricEntry>>,
    failing_keys: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every submission under `key`.
    pub fn fail_key(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    /// Accepted entries, in submission order.
    pub fn entries(&self) -> Vec<MetricEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn values_for(&self, key: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.key == key)
            .map(|e| e.value)
            .collect()
    }
}

#[async_trait]
impl MetricSink for MemorySink {
    async fn submit(&self, entry: &MetricEntry) -> Result<()> {
        if self.failing_keys.contains(&entry.key) {
            return Err(SinkError::Rejected {
                key: entry.key.clone(),
                exit_code: 2,
                output: "processed: 0; failed: 1".to_string(),
            });
        }
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry.clone()),
            Err(poisoned) => poisoned.into_inner().push(entry.clone()),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
