//! Projections from normalized records to LLD items.

use cvmon_api::jobs::Job;
use cvmon_api::libraries::Library;
use cvmon_api::media_agents::MediaAgent;
use cvmon_common::{DiscoveryItem, LldMacro};

/// One item per record, in input order. Duplicates are kept.
pub fn build_discovery<T>(
    records: &[T],
    projection: impl Fn(&T) -> DiscoveryItem,
) -> Vec<DiscoveryItem> {
    records.iter().map(projection).collect()
}

pub fn media_agent_item(agent: &MediaAgent) -> DiscoveryItem {
    DiscoveryItem::new().with(LldMacro::Hostname, &agent.display_name)
}

pub fn library_item(library: &Library) -> DiscoveryItem {
    DiscoveryItem::new().with(LldMacro::LibraryName, &library.name)
}

pub fn failed_job_item(job: &Job) -> DiscoveryItem {
    DiscoveryItem::new()
        .with(LldMacro::JobId, &job.id)
        .with(LldMacro::LocalizedStatus, &job.localized_status)
        .with(LldMacro::JobType, &job.job_type)
        .with(LldMacro::BackupLevelName, &job.backup_level)
        .with(LldMacro::ClientName, &job.client_name)
        .with(LldMacro::InstanceName, &job.instance_name)
        .with(LldMacro::PendingReason, &job.pending_reason)
}
