use crate::client::ApiSource;
use crate::error::Result;
use crate::{fetch_records, optional_array, required, scalar_to_string, string_at};
use serde_json::Value;

pub const MEDIA_AGENTS_PATH: &str = "/V4/mediaAgent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAgent {
    pub display_name: String,
    pub status: String,
}

pub fn project_media_agents(raw: &Value, endpoint: &str) -> Result<Vec<MediaAgent>> {
    optional_array(raw, "mediaAgents")
        .iter()
        .map(|ma| {
            Ok(MediaAgent {
                display_name: scalar_to_string(required(ma, "/displayName", endpoint)?),
                status: string_at(ma, "/status"),
            })
        })
        .collect()
}

pub async fn fetch_media_agents(api: &dyn ApiSource) -> Result<Vec<MediaAgent>> {
    fetch_records(api, MEDIA_AGENTS_PATH, project_media_agents).await
}
