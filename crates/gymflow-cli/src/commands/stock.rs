//! Stock command handlers

use anyhow::{bail, Result};
use serde_json::{json, Map, Value};

use gymflow_core::ApiClient;

use crate::output::Output;

use super::report_outcome;

/// List stock items
pub async fn list(client: &ApiClient, search: Option<String>, output: &Output) -> Result<()> {
    let endpoint = match search {
        Some(ref q) => format!("/api/stock?search={}", q),
        None => "/api/stock".to_string(),
    };
    let items = client.get(&endpoint).await?;
    output.print_rows(
        &items,
        &["id", "name", "category", "quantity", "unit", "minThreshold"],
    );
    Ok(())
}

/// Add a stock item
pub async fn add(
    client: &ApiClient,
    name: String,
    category: String,
    unit: String,
    quantity: i64,
    min_threshold: i64,
    output: &Output,
) -> Result<()> {
    let body = json!({
        "name": name,
        "category": category,
        "unit": unit,
        "quantity": quantity,
        "min_threshold": min_threshold,
    });
    let outcome = client.post("/api/stock", body).await?;
    report_outcome(&outcome, &format!("Added stock item: {}", name), output);
    Ok(())
}

/// Update stock item fields; only flags that were given are sent
#[allow(clippy::too_many_arguments)]
pub async fn update(
    client: &ApiClient,
    id: String,
    name: Option<String>,
    category: Option<String>,
    unit: Option<String>,
    quantity: Option<i64>,
    min_threshold: Option<i64>,
    output: &Output,
) -> Result<()> {
    let mut fields = Map::new();
    if let Some(name) = name {
        fields.insert("name".to_string(), Value::String(name));
    }
    if let Some(category) = category {
        fields.insert("category".to_string(), Value::String(category));
    }
    if let Some(unit) = unit {
        fields.insert("unit".to_string(), Value::String(unit));
    }
    if let Some(quantity) = quantity {
        fields.insert("quantity".to_string(), Value::from(quantity));
    }
    if let Some(min_threshold) = min_threshold {
        fields.insert("min_threshold".to_string(), Value::from(min_threshold));
    }
    if fields.is_empty() {
        bail!("Nothing to update, pass at least one field flag");
    }

    let outcome = client
        .put(&format!("/api/stock/{}", id), Value::Object(fields))
        .await?;
    report_outcome(&outcome, &format!("Updated stock item: {}", id), output);
    Ok(())
}

/// Delete a stock item
pub async fn delete(client: &ApiClient, id: String, output: &Output) -> Result<()> {
    let outcome = client.delete(&format!("/api/stock/{}", id)).await?;
    report_outcome(&outcome, &format!("Deleted stock item: {}", id), output);
    Ok(())
}

/// Record a stock movement (in/out)
pub async fn movement(
    client: &ApiClient,
    id: String,
    kind: String,
    quantity: i64,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    if kind != "in" && kind != "out" {
        bail!("Movement type must be 'in' or 'out', got '{}'", kind);
    }
    let body = json!({
        "type": kind,
        "quantity": quantity,
        "note": note,
    });
    let outcome = client
        .post(&format!("/api/stock/{}/movement", id), body)
        .await?;
    report_outcome(
        &outcome,
        &format!("Recorded stock {} of {} for item {}", kind, quantity, id),
        output,
    );
    Ok(())
}

/// List recent stock movements
pub async fn movements(client: &ApiClient, output: &Output) -> Result<()> {
    let movements = client.get("/api/stock/movements").await?;
    output.print_rows(
        &movements,
        &["id", "itemName", "type", "quantity", "date", "note"],
    );
    Ok(())
}
