//! CommCell identity, license and health report.

use crate::client::ApiSource;
use crate::error::Result;
use crate::{required, required_array, scalar_to_string, string_at, ApiConfig};
use serde_json::Value;
use std::fmt;

pub const LICENSE_PATH: &str = "/V4/License";
pub const COMMSERV_PATH: &str = "/CommServ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommCellRelease {
    pub release_name: String,
    pub version: String,
}

impl fmt::Display for CommCellRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.release_name, self.version)
    }
}

/// One row of the health report: severity tag (`1_Good`, ...) and its count.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthRow {
    pub label: String,
    pub count: Value,
}

pub fn health_path(config: &ApiConfig) -> String {
    format!(
        "/cr/reportsplusengine/datasets/{}/data?cache=true&parameter.commUniId={}",
        config.health_dataset_id, config.health_comm_uni_id
    )
}

pub fn project_expiry_date(raw: &Value, endpoint: &str) -> Result<String> {
    Ok(scalar_to_string(required(raw, "/expiryDate", endpoint)?))
}

pub fn project_commcell_name(raw: &Value, endpoint: &str) -> Result<String> {
    Ok(scalar_to_string(required(raw, "/commcell/commCellName", endpoint)?))
}

pub fn project_release(raw: &Value, endpoint: &str) -> Result<CommCellRelease> {
    Ok(CommCellRelease {
        release_name: scalar_to_string(required(raw, "/releaseName", endpoint)?),
        version: string_at(raw, "/csVersionInfo"),
    })
}

/// Rows shorter than three columns carry no count and are skipped.
pub fn project_health(raw: &Value, endpoint: &str) -> Result<Vec<HealthRow>> {
    Ok(required_array(raw, "/records", endpoint)?
        .iter()
        .filter_map(|row| {
            let cols = row.as_array()?;
            if cols.len() < 3 {
                return None;
            }
            Some(HealthRow {
                label: scalar_to_string(&cols[1]),
                count: cols[2].clone(),
            })
        })
        .collect())
}

pub async fn fetch_expiry_date(api: &dyn ApiSource) -> Result<String> {
    let raw = api.get_json(LICENSE_PATH).await?;
    project_expiry_date(&raw, LICENSE_PATH)
}

pub async fn fetch_commcell_name(api: &dyn ApiSource) -> Result<String> {
    let raw = api.get_json(COMMSERV_PATH).await?;
    project_commcell_name(&raw, COMMSERV_PATH)
}

pub async fn fetch_release(api: &dyn ApiSource) -> Result<CommCellRelease> {
    let raw = api.get_json(COMMSERV_PATH).await?;
    project_release(&raw, COMMSERV_PATH)
}

pub async fn fetch_health(api: &dyn ApiSource, config: &ApiConfig) -> Result<Vec<HealthRow>> {
    let path = health_path(config);
    let raw = api.get_json(&path).await?;
    let rows = project_health(&raw, &path)?;
    tracing::debug!(endpoint = %path, count = rows.len(), "Fetched health rows");
    Ok(rows)
}
