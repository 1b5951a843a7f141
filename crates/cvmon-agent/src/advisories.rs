//! Commvault security advisories, scraped from the public advisories page.

use anyhow::{anyhow, Context, Result};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

pub const ADVISORIES_URL: &str = "https://documentation.commvault.com/securityadvisories/";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Placeholder title the page uses for rows without an advisory.
const EMPTY_TITLE: &str = "none";

/// One row of the advisories table, serialized with the established
/// `vulnerabilities.json` field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Título")]
    pub title: String,
    #[serde(rename = "Data")]
    pub date: String,
}

fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {css}: {e:?}"))
}

/// Text nodes of an element, trimmed and joined by single spaces.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rows of the first table on the page, header excluded. Rows with fewer
/// than three cells or a `none` title are dropped.
pub fn parse_advisories(html: &str) -> Result<Vec<Advisory>> {
    let document = Html::parse_document(html);
    let (table_sel, row_sel, cell_sel) = (selector("table")?, selector("tr")?, selector("td")?);

    let Some(table) = document.select(&table_sel).next() else {
        tracing::warn!("No advisories table found on the page");
        return Ok(Vec::new());
    };

    let advisories = table
        .select(&row_sel)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
            match cells.as_slice() {
                [id, title, date, ..] if title != EMPTY_TITLE => Some(Advisory {
                    id: id.clone(),
                    title: title.clone(),
                    date: date.clone(),
                }),
                _ => None,
            }
        })
        .collect();
    Ok(advisories)
}

/// Pretty JSON array with four-space indentation.
pub fn write_advisories<W: Write>(writer: W, advisories: &[Advisory]) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    advisories.serialize(&mut ser)?;
    Ok(())
}

pub async fn fetch_page(url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;
    let page = client
        .get(url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .with_context(|| format!("Failed to fetch {url}"))?
        .text()
        .await
        .with_context(|| format!("Failed to read {url}"))?;
    Ok(page)
}

/// Parse `html` and write the advisories to `output`. Returns the row count.
pub fn save_advisories(html: &str, output: &Path) -> Result<usize> {
    let advisories = parse_advisories(html)?;
    let file = std::fs::File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    write_advisories(&mut writer, &advisories)?;
    writer.flush()?;
    tracing::info!(
        path = %output.display(),
        advisories = advisories.len(),
        "Advisories written"
    );
    Ok(advisories.len())
}

pub async fn export_advisories(url: &str, output: &Path) -> Result<usize> {
    let html = fetch_page(url).await?;
    save_advisories(&html, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<h1>Security Advisories</h1>
<table>
  <tr><th>ID</th><th>Title</th><th>Date</th></tr>
  <tr><td>CV_2025_03_1</td><td> Critical <b>Webserver</b> Vulnerability </td><td>2025-03-06</td></tr>
  <tr><td>CV_2025_02_9</td><td>none</td><td>2025-02-20</td></tr>
  <tr><td>CV_2025_01_2</td><td>Short row</td></tr>
  <tr><td>CV_2024_12_1</td><td>Privilege Escalation</td><td>2024-12-10</td><td>extra</td></tr>
</table>
<table><tr><td>other</td><td>table</td><td>ignored</td></tr></table>
</body></html>"#;

    #[test]
    fn rows_are_parsed_and_placeholders_dropped() {
        let advisories = parse_advisories(PAGE).unwrap();
        assert_eq!(
            advisories,
            vec![
                Advisory {
                    id: "CV_2025_03_1".to_string(),
                    title: "Critical Webserver Vulnerability".to_string(),
                    date: "2025-03-06".to_string(),
                },
                Advisory {
                    id: "CV_2024_12_1".to_string(),
                    title: "Privilege Escalation".to_string(),
                    date: "2024-12-10".to_string(),
                },
            ]
        );
    }

    #[test]
    fn page_without_table_yields_nothing() {
        let advisories = parse_advisories("<html><body><p>Maintenance</p></body></html>").unwrap();
        assert!(advisories.is_empty());
    }

    #[test]
    fn json_keeps_field_names_and_utf8() {
        let advisories = vec![Advisory {
            id: "CV_1".to_string(),
            title: "Execução remota".to_string(),
            date: "2025-01-01".to_string(),
        }];
        let mut buf = Vec::new();
        write_advisories(&mut buf, &advisories).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "[\n    {\n        \"ID\": \"CV_1\",\n        \"Título\": \"Execução remota\",\n        \"Data\": \"2025-01-01\"\n    }\n]"
        );
    }

    #[test]
    fn save_writes_an_empty_array_when_nothing_matches() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("vulnerabilities.json");

        let count = save_advisories("<p>no table</p>", &output).unwrap();

        assert_eq!(count, 0);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "[]");
    }

    #[test]
    fn save_writes_parsed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("vulnerabilities.json");

        assert_eq!(save_advisories(PAGE, &output).unwrap(), 2);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written[0]["ID"], "CV_2025_03_1");
        assert_eq!(written[1]["Data"], "2024-12-10");
    }
}
