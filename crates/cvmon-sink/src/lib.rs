//! Delivery of metrics and discovery batches to the Zabbix trapper.
//!
//! Every submission goes through a [`MetricSink`]. The production sink is
//! [`zabbix::ZabbixSender`], which runs one `zabbix_sender` process per
//! entry; [`memory::MemorySink`] records entries for tests.

pub mod error;
pub mod memory;
pub mod zabbix;

pub use error::{Result, SinkError};
pub use memory::MemorySink;
pub use zabbix::ZabbixSender;

use async_trait::async_trait;
use cvmon_common::{discovery_payload, DiscoveryItem, MetricEntry};
use serde::{Deserialize, Serialize};

/// A destination for trapper submissions.
#[async_trait]
pub trait MetricSink: Send + Sync {
    /// Submits one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry was not accepted.
    async fn submit(&self, entry: &MetricEntry) -> Result<()>;

    /// Returns the sink name (e.g., `"zabbix_sender"`).
    fn name(&self) -> &str;

    /// Submits entries in order. A failed entry is recorded and the rest are
    /// still attempted.
    async fn submit_batch(&self, entries: &[MetricEntry]) -> BatchReport {
        let mut report = BatchReport::default();
        for entry in entries {
            match self.submit(entry).await {
                Ok(()) => report.submitted += 1,
                Err(e) => {
                    tracing::warn!(
                        sink = self.name(),
                        key = %entry.key,
                        error = %e,
                        "Submission failed"
                    );
                    report.failures.push(SinkFailure {
                        entry: entry.clone(),
                        error: e,
                    });
                }
            }
        }
        report
    }
}

/// Serializes a discovery batch as one JSON array and submits it under `key`.
pub async fn submit_discovery(
    sink: &dyn MetricSink,
    key: &str,
    items: &[DiscoveryItem],
) -> Result<()> {
    let payload = discovery_payload(items)?;
    sink.submit(&MetricEntry::new(key, payload)).await?;
    tracing::info!(key = %key, items = items.len(), "Discovery submitted");
    Ok(())
}

#[derive(Debug)]
pub struct SinkFailure {
    pub entry: MetricEntry,
    pub error: SinkError,
}

/// Outcome of [`MetricSink::submit_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub submitted: usize,
    pub failures: Vec<SinkFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Trapper connection and item keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrapperConfig {
    /// Zabbix server or proxy address (`-z`).
    #[serde(default)]
    pub server: String,
    /// Trapper port (`-p`); the sender's default when unset.
    #[serde(default)]
    pub port: Option<u16>,
    /// Monitored host name as configured in Zabbix (`-s`).
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_sender_path")]
    pub sender_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub keys: DiscoveryKeys,
}

fn default_sender_path() -> String {
    "zabbix_sender".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TrapperConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: None,
            host: String::new(),
            sender_path: default_sender_path(),
            timeout_secs: default_timeout_secs(),
            keys: DiscoveryKeys::default(),
        }
    }
}

/// Item keys the discovery batches are sent under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryKeys {
    #[serde(default = "default_media_agents_key")]
    pub media_agents: String,
    #[serde(default = "default_libraries_key")]
    pub libraries: String,
    /// Falls back to `media_agents` when unset.
    #[serde(default)]
    pub jobs: Option<String>,
}

fn default_media_agents_key() -> String {
    "custom.discovery.ma".to_string()
}

fn default_libraries_key() -> String {
    "custom.discovery.library".to_string()
}

impl Default for DiscoveryKeys {
    fn default() -> Self {
        Self {
            media_agents: default_media_agents_key(),
            libraries: default_libraries_key(),
            jobs: None,
        }
    }
}

impl DiscoveryKeys {
    pub fn jobs_key(&self) -> &str {
        match self.jobs.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => &self.media_agents,
        }
    }
}
