//! Transaction command handlers

use anyhow::{bail, Result};
use chrono::Utc;
use serde_json::{json, Map, Value};

use gymflow_core::ApiClient;

use crate::output::Output;

use super::report_outcome;

/// List transactions with optional type/month filters
pub async fn list(
    client: &ApiClient,
    kind: Option<String>,
    month: Option<String>,
    output: &Output,
) -> Result<()> {
    let endpoint = list_endpoint(kind.as_deref(), month.as_deref());
    let transactions = client.get(&endpoint).await?;
    output.print_rows(
        &transactions,
        &["id", "type", "category", "amount", "date", "note"],
    );
    Ok(())
}

/// Record an income or expense transaction
pub async fn add(
    client: &ApiClient,
    kind: String,
    category: String,
    amount: i64,
    date: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    if kind != "income" && kind != "expense" {
        bail!("Transaction type must be 'income' or 'expense', got '{}'", kind);
    }
    let body = json!({
        "type": kind,
        "category": category,
        "amount": amount,
        "date": date.unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
        "note": note,
    });
    let outcome = client.post("/api/transactions", body).await?;
    report_outcome(&outcome, &format!("Recorded {} transaction", kind), output);
    Ok(())
}

/// Update transaction fields; only flags that were given are sent
pub async fn update(
    client: &ApiClient,
    id: String,
    category: Option<String>,
    amount: Option<i64>,
    date: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut fields = Map::new();
    if let Some(category) = category {
        fields.insert("category".to_string(), Value::String(category));
    }
    if let Some(amount) = amount {
        fields.insert("amount".to_string(), Value::from(amount));
    }
    if let Some(date) = date {
        fields.insert("date".to_string(), Value::String(date));
    }
    if let Some(note) = note {
        fields.insert("note".to_string(), Value::String(note));
    }
    if fields.is_empty() {
        bail!("Nothing to update, pass at least one field flag");
    }

    let outcome = client
        .put(&format!("/api/transactions/{}", id), Value::Object(fields))
        .await?;
    report_outcome(&outcome, &format!("Updated transaction: {}", id), output);
    Ok(())
}

/// Delete a transaction. The server restricts this to superadmin.
pub async fn delete(client: &ApiClient, id: String, output: &Output) -> Result<()> {
    let outcome = client.delete(&format!("/api/transactions/{}", id)).await?;
    report_outcome(&outcome, &format!("Deleted transaction: {}", id), output);
    Ok(())
}

/// Build the list endpoint; the server's filter params are `type_filter`
/// and `month`
fn list_endpoint(kind: Option<&str>, month: Option<&str>) -> String {
    let mut params = Vec::new();
    if let Some(kind) = kind {
        params.push(format!("type_filter={}", kind));
    }
    if let Some(month) = month {
        params.push(format!("month={}", month));
    }
    if params.is_empty() {
        "/api/transactions".to_string()
    } else {
        format!("/api/transactions?{}", params.join("&"))
    }
}
