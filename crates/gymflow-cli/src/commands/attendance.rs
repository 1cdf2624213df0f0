//! Attendance listing command handler

use anyhow::Result;

use gymflow_core::ApiClient;

use crate::output::Output;

/// List check-ins for a day, defaulting to today on the server side
pub async fn list(client: &ApiClient, date: Option<String>, output: &Output) -> Result<()> {
    let endpoint = match date {
        Some(ref d) => format!("/api/attendance?target_date={}", d),
        None => "/api/attendance".to_string(),
    };
    let records = client.get(&endpoint).await?;
    output.print_rows(&records, &["id", "memberName", "date", "time", "type"]);
    Ok(())
}
