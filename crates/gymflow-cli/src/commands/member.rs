//! Member command handlers

use anyhow::Result;
use serde_json::{json, Map, Value};

use gymflow_core::ApiClient;

use crate::output::Output;

use super::report_outcome;

/// List members, optionally filtered by name or phone
pub async fn list(client: &ApiClient, search: Option<String>, output: &Output) -> Result<()> {
    let endpoint = match search {
        Some(ref q) => format!("/api/members?search={}", q),
        None => "/api/members".to_string(),
    };
    let members = client.get(&endpoint).await?;
    output.print_rows(&members, &["id", "name", "phone", "plan", "status", "endDate"]);
    Ok(())
}

/// Register a new member
pub async fn add(
    client: &ApiClient,
    name: String,
    phone: String,
    plan: String,
    start: String,
    end: String,
    output: &Output,
) -> Result<()> {
    let body = json!({
        "name": name,
        "phone": phone,
        "plan": plan,
        "start_date": start,
        "end_date": end,
    });
    let outcome = client.post("/api/members", body).await?;
    report_outcome(&outcome, &format!("Registered member: {}", name), output);
    Ok(())
}

/// Update member fields; only flags that were given are sent
#[allow(clippy::too_many_arguments)]
pub async fn update(
    client: &ApiClient,
    id: String,
    name: Option<String>,
    phone: Option<String>,
    plan: Option<String>,
    start: Option<String>,
    end: Option<String>,
    status: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut fields = Map::new();
    let pairs = [
        ("name", name),
        ("phone", phone),
        ("plan", plan),
        ("start_date", start),
        ("end_date", end),
        ("status", status),
    ];
    for (key, value) in pairs {
        if let Some(value) = value {
            fields.insert(key.to_string(), Value::String(value));
        }
    }
    if fields.is_empty() {
        anyhow::bail!("Nothing to update, pass at least one field flag");
    }

    let outcome = client
        .put(&format!("/api/members/{}", id), Value::Object(fields))
        .await?;
    report_outcome(&outcome, &format!("Updated member: {}", id), output);
    Ok(())
}

/// Delete a member
pub async fn delete(client: &ApiClient, id: String, output: &Output) -> Result<()> {
    let outcome = client.delete(&format!("/api/members/{}", id)).await?;
    report_outcome(&outcome, &format!("Deleted member: {}", id), output);
    Ok(())
}

/// Check a member in
pub async fn checkin(client: &ApiClient, id: String, output: &Output) -> Result<()> {
    let outcome = client
        .post(&format!("/api/members/{}/checkin", id), json!({}))
        .await?;
    report_outcome(&outcome, &format!("Checked in member: {}", id), output);
    Ok(())
}
