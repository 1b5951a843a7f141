use crate::client::ApiSource;
use crate::error::Result;
use crate::{fetch_records, required, required_array, scalar_to_string, DetailResults};
use serde_json::Value;

pub const CLIENTS_PATH: &str = "/Client";

/// Client entity type reserved for internal CommServe objects.
pub const EXCLUDED_CLIENT_TYPE: i64 = 106;

/// Sentinel written when a client has no install directory.
pub const NOT_AVAILABLE: &str = "N/A";

/// Resolved configuration of one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub id: String,
    pub display_name: String,
    pub install_directory: String,
}

pub fn client_path(id: &str) -> String {
    format!("{CLIENTS_PATH}/{id}")
}

/// IDs of every client whose entity type is not [`EXCLUDED_CLIENT_TYPE`].
pub fn project_client_ids(raw: &Value, endpoint: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for client in required_array(raw, "/clientProperties", endpoint)? {
        let entity = required(client, "/client/clientEntity", endpoint)?;
        if entity.get("_type_").and_then(Value::as_i64) == Some(EXCLUDED_CLIENT_TYPE) {
            continue;
        }
        ids.push(scalar_to_string(required(entity, "/clientId", endpoint)?));
    }
    Ok(ids)
}

pub fn project_client_detail(raw: &Value, endpoint: &str, id: &str) -> Result<ClientConfig> {
    let client = required(raw, "/clientProperties/0/client", endpoint)?;
    let install_directory = match client.get("installDirectory") {
        Some(Value::String(dir)) if !dir.is_empty() => dir.clone(),
        _ => NOT_AVAILABLE.to_string(),
    };
    Ok(ClientConfig {
        id: id.to_string(),
        display_name: client
            .get("displayName")
            .map(scalar_to_string)
            .unwrap_or_default(),
        install_directory,
    })
}

pub async fn fetch_client_ids(api: &dyn ApiSource) -> Result<Vec<String>> {
    fetch_records(api, CLIENTS_PATH, project_client_ids).await
}

/// Resolve display name and install directory for each id, one call per id.
pub async fn fetch_client_configs(
    api: &dyn ApiSource,
    ids: &[String],
) -> DetailResults<ClientConfig> {
    let mut results = DetailResults::default();
    for id in ids {
        let path = client_path(id);
        let detail = match api.get_json(&path).await {
            Ok(raw) => project_client_detail(&raw, &path, id),
            Err(e) => Err(e),
        };
        if let Err(ref e) = detail {
            tracing::warn!(client_id = %id, error = %e, "Failed to resolve client");
        }
        results.push(detail);
    }
    results
}
