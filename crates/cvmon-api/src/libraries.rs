use crate::client::ApiSource;
use crate::error::{ApiError, Result};
use crate::{fetch_records, required, required_array, scalar_to_string, DetailResults};
use serde_json::Value;

pub const LIBRARIES_PATH: &str = "/Library";

/// Library as listed by `/Library`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub id: String,
    pub name: String,
}

/// Capacity summary of one disk library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDetail {
    pub name: String,
    /// `magLibSummary` as (human readable metric name, value).
    pub summary: Vec<(String, String)>,
}

pub fn library_path(id: &str) -> String {
    format!("{LIBRARIES_PATH}/{id}")
}

pub fn project_libraries(raw: &Value, endpoint: &str) -> Result<Vec<Library>> {
    required_array(raw, "/response", endpoint)?
        .iter()
        .map(|entry| {
            Ok(Library {
                id: scalar_to_string(required(entry, "/entityInfo/id", endpoint)?),
                name: scalar_to_string(required(entry, "/entityInfo/name", endpoint)?),
            })
        })
        .collect()
}

pub fn project_library_detail(raw: &Value, endpoint: &str) -> Result<LibraryDetail> {
    let name = scalar_to_string(required(raw, "/libraryInfo/library/libraryName", endpoint)?);
    let summary = required(raw, "/libraryInfo/magLibSummary", endpoint)?
        .as_object()
        .ok_or_else(|| ApiError::malformed(endpoint, "/libraryInfo/magLibSummary"))?
        .iter()
        .map(|(metric, value)| (metric.clone(), scalar_to_string(value)))
        .collect();
    Ok(LibraryDetail { name, summary })
}

pub async fn fetch_libraries(api: &dyn ApiSource) -> Result<Vec<Library>> {
    fetch_records(api, LIBRARIES_PATH, project_libraries).await
}

/// One detail call per library, strictly in order.
pub async fn fetch_library_details(
    api: &dyn ApiSource,
    libraries: &[Library],
) -> DetailResults<LibraryDetail> {
    let mut results = DetailResults::default();
    for library in libraries {
        let path = library_path(&library.id);
        let detail = match api.get_json(&path).await {
            Ok(raw) => project_library_detail(&raw, &path),
            Err(e) => Err(e),
        };
        if let Err(ref e) = detail {
            tracing::warn!(
                library = %library.name,
                id = %library.id,
                error = %e,
                "Failed to fetch library detail"
            );
        }
        results.push(detail);
    }
    results
}
