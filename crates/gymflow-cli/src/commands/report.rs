//! Report export command handlers

use anyhow::{Context, Result};
use chrono::Utc;

use gymflow_core::ApiClient;

use crate::output::Output;

/// Download a report export and write it to disk.
///
/// Report downloads are read-only and never queue; offline they fail
/// with a connectivity error like any other read.
pub async fn download(
    client: &ApiClient,
    kind: &str,
    format: String,
    start: Option<String>,
    end: Option<String>,
    out: Option<String>,
    output: &Output,
) -> Result<()> {
    let endpoint = export_endpoint(kind, &format, start.as_deref(), end.as_deref());
    let bytes = client.download(&endpoint).await?;

    let path = out.unwrap_or_else(|| {
        format!("{}-report-{}.{}", kind, Utc::now().format("%Y%m%d"), format)
    });
    std::fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path))?;

    output.success(&format!("Saved {} report to {}", kind, path));
    Ok(())
}

/// Build the export endpoint; the server filters on `start_date`/`end_date`
fn export_endpoint(kind: &str, format: &str, start: Option<&str>, end: Option<&str>) -> String {
    let mut params = vec![format!("format={}", format)];
    if let Some(start) = start {
        params.push(format!("start_date={}", start));
    }
    if let Some(end) = end {
        params.push(format!("end_date={}", end));
    }
    format!("/api/reports/{}/export?{}", kind, params.join("&"))
}
