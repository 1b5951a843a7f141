use anyhow::{Context, Result};
use cvmon_api::clients::{fetch_client_configs, fetch_client_ids, ClientConfig};
use cvmon_api::ApiSource;
use std::io::Write;
use std::path::Path;

#[derive(Debug, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Resolve every client and write `ClientName,InstallDirectory` rows to
/// `output`. Clients whose detail call fails are skipped.
pub async fn export_clients(api: &dyn ApiSource, output: &Path) -> Result<ExportSummary> {
    let ids = fetch_client_ids(api).await.context("Failed to list clients")?;
    let results = fetch_client_configs(api, &ids).await;

    let file = std::fs::File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    write_clients_csv(file, &results.records)?;

    let summary = ExportSummary {
        written: results.records.len(),
        skipped: results.errors.len(),
    };
    tracing::info!(
        path = %output.display(),
        written = summary.written,
        skipped = summary.skipped,
        "Client export written"
    );
    Ok(summary)
}

pub fn write_clients_csv<W: Write>(writer: W, clients: &[ClientConfig]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["ClientName", "InstallDirectory"])?;
    for client in clients {
        out.write_record([client.display_name.as_str(), client.install_directory.as_str()])?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvmon_api::clients::CLIENTS_PATH;
    use cvmon_api::mock::MockApi;
    use serde_json::json;

    #[test]
    fn fields_with_commas_are_quoted() {
        let clients = vec![ClientConfig {
            id: "2".to_string(),
            display_name: "fs01, primary".to_string(),
            install_directory: "/opt/commvault".to_string(),
        }];
        let mut buf = Vec::new();
        write_clients_csv(&mut buf, &clients).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "ClientName,InstallDirectory\n\"fs01, primary\",/opt/commvault\n"
        );
    }

    #[tokio::test]
    async fn export_skips_failed_clients() {
        let api = MockApi::new()
            .with_json(
                CLIENTS_PATH,
                json!({"clientProperties": [
                    {"client": {"clientEntity": {"clientId": 2, "_type_": 3}}},
                    {"client": {"clientEntity": {"clientId": 4, "_type_": 106}}},
                    {"client": {"clientEntity": {"clientId": 7, "_type_": 3}}}
                ]}),
            )
            .with_json(
                "/Client/2",
                json!({"clientProperties": [{"client": {"displayName": "fs01"}}]}),
            )
            .with_status("/Client/7", 500);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("clients_info.csv");

        let summary = export_clients(&api, &output).await.unwrap();

        assert_eq!(summary, ExportSummary { written: 1, skipped: 1 });
        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(content, "ClientName,InstallDirectory\nfs01,N/A\n");
    }

    #[tokio::test]
    async fn list_failure_writes_nothing() {
        let api = MockApi::new().with_status(CLIENTS_PATH, 401);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("clients_info.csv");

        assert!(export_clients(&api, &output).await.is_err());
        assert!(!output.exists());
    }
}
