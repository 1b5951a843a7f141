use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// A single trapper submission: item key plus value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub key: String,
    pub value: String,
}

impl MetricEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for MetricEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

/// Low-level discovery macro names understood by the monitoring templates.
///
/// The set is closed: discovery items can only carry these macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LldMacro {
    Hostname,
    Status,
    LibraryName,
    JobId,
    LocalizedStatus,
    JobType,
    BackupLevelName,
    ClientName,
    InstanceName,
    PendingReason,
}

impl LldMacro {
    pub fn as_str(&self) -> &'static str {
        match self {
            LldMacro::Hostname => "{#HOSTNAME}",
            LldMacro::Status => "{#STATUS}",
            LldMacro::LibraryName => "{#LIBRARYNAME}",
            LldMacro::JobId => "{#JOBID}",
            LldMacro::LocalizedStatus => "{#LOCALIZEDSTATUS}",
            LldMacro::JobType => "{#JOBTYPE}",
            LldMacro::BackupLevelName => "{#BACKUPLEVELNAME}",
            LldMacro::ClientName => "{#CLIENTNAME}",
            LldMacro::InstanceName => "{#INSTANCENAME}",
            LldMacro::PendingReason => "{#PENDINGREASON}",
        }
    }
}

impl std::fmt::Display for LldMacro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered entity, serialized as a JSON object of macro → string.
///
/// # Examples
///
/// ```
/// use cvmon_common::{DiscoveryItem, LldMacro};
///
/// let item = DiscoveryItem::new().with(LldMacro::Hostname, "ma01");
/// assert_eq!(serde_json::to_string(&item).unwrap(), r#"{"{#HOSTNAME}":"ma01"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryItem {
    macros: BTreeMap<LldMacro, String>,
}

impl DiscoveryItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: LldMacro, value: impl Into<String>) -> Self {
        self.macros.insert(name, value.into());
        self
    }

    pub fn get(&self, name: LldMacro) -> Option<&str> {
        self.macros.get(&name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

impl Serialize for DiscoveryItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.macros.len()))?;
        for (name, value) in &self.macros {
            map.serialize_entry(name.as_str(), value)?;
        }
        map.end()
    }
}

/// Render a discovery batch as the JSON array the trapper item expects.
pub fn discovery_payload(items: &[DiscoveryItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

/// Job states tallied by the job summary pipeline.
///
/// # Examples
///
/// ```
/// use cvmon_common::JobStatus;
///
/// let status: JobStatus = "Running".parse().unwrap();
/// assert_eq!(status, JobStatus::Running);
/// assert_eq!(status.metric_key(), "commvault.running_jobs");
/// assert!("Killed".parse::<JobStatus>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobStatus {
    Failed,
    Running,
    Completed,
    Queued,
    Waiting,
    Pending,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Failed,
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Queued,
        JobStatus::Waiting,
        JobStatus::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Failed => "Failed",
            JobStatus::Running => "Running",
            JobStatus::Completed => "Completed",
            JobStatus::Queued => "Queued",
            JobStatus::Waiting => "Waiting",
            JobStatus::Pending => "Pending",
        }
    }

    pub fn metric_key(&self) -> &'static str {
        match self {
            JobStatus::Failed => "commvault.failed_jobs",
            JobStatus::Running => "commvault.running_jobs",
            JobStatus::Completed => "commvault.completed_jobs",
            JobStatus::Queued => "commvault.queued_jobs",
            JobStatus::Waiting => "commvault.waiting_jobs",
            JobStatus::Pending => "commvault.pending_jobs",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown job status: {s}"))
    }
}

/// Per-status job counts for one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCounts {
    counts: BTreeMap<JobStatus, u64>,
}

impl AggregateCounts {
    /// All statuses present with a zero count.
    pub fn new() -> Self {
        Self {
            counts: JobStatus::ALL.into_iter().map(|s| (s, 0)).collect(),
        }
    }

    pub fn record(&mut self, status: JobStatus) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    pub fn get(&self, status: JobStatus) -> u64 {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobStatus, u64)> + '_ {
        self.counts.iter().map(|(s, n)| (*s, *n))
    }

    /// One `commvault.<status>_jobs` entry per status, zeros included.
    pub fn to_metrics(&self) -> Vec<MetricEntry> {
        self.iter()
            .map(|(status, count)| MetricEntry::new(status.metric_key(), count.to_string()))
            .collect()
    }
}

impl Default for AggregateCounts {
    fn default() -> Self {
        Self::new()
    }
}

/// Severity buckets of the CommCell health report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthBucket {
    Good,
    Info,
    Warning,
    Critical,
}

impl HealthBucket {
    pub const ALL: [HealthBucket; 4] = [
        HealthBucket::Good,
        HealthBucket::Info,
        HealthBucket::Warning,
        HealthBucket::Critical,
    ];

    /// Label used by the health dataset rows.
    pub fn tag(&self) -> &'static str {
        match self {
            HealthBucket::Good => "1_Good",
            HealthBucket::Info => "2_Info",
            HealthBucket::Warning => "3_Warning",
            HealthBucket::Critical => "4_Critical",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        HealthBucket::ALL.into_iter().find(|b| b.tag() == tag)
    }

    pub fn metric_key(&self) -> &'static str {
        match self {
            HealthBucket::Good => "key.health-good",
            HealthBucket::Info => "key.health-info",
            HealthBucket::Warning => "key.health-warning",
            HealthBucket::Critical => "key.health-critical",
        }
    }
}
