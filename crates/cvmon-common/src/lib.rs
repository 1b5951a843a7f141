//! Shared data model for the cvmon workspace.
//!
//! [`types`] holds the values that flow from the fetchers to the trapper
//! sink; [`sanitize`] cleans free-text API fields before they are embedded
//! in item keys or values.

pub mod sanitize;
pub mod types;

pub use sanitize::{sanitize_text, sanitize_value};
pub use types::{
    discovery_payload, AggregateCounts, DiscoveryItem, HealthBucket, JobStatus, LldMacro,
    MetricEntry,
};
