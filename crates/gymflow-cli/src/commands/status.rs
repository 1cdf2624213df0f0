//! Status command handler

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use gymflow_core::{ApiClient, Config, ConnectivityProbe, Indicator};

use crate::output::{Output, OutputFormat};

/// Show server reachability, session, and the pending queue
pub async fn show(config: &Config, client: &Arc<ApiClient>, output: &Output) -> Result<()> {
    let online = client.check().await;
    let pending = client.queue().lock().await.snapshot();
    let session = client.sessions().lock().await.current().cloned();

    let indicator = match (online, pending.len()) {
        (false, _) => Indicator::Offline,
        (true, 0) => Indicator::Online,
        (true, n) => Indicator::Pending(n),
    };

    if output.format == OutputFormat::Json {
        let queue: Vec<_> = pending
            .iter()
            .map(|entry| {
                json!({
                    "id": entry.id,
                    "method": entry.call.method(),
                    "endpoint": entry.endpoint,
                    "timestamp": entry.timestamp,
                })
            })
            .collect();
        output.print_value(&json!({
            "server": config.server_url,
            "online": online,
            "indicator": indicator.label(),
            "pending": queue,
            "user": session.map(|s| s.user.username),
        }));
        return Ok(());
    }

    output.message(&format!("Server:    {}", config.server_url));
    output.message(&format!("Status:    {}", indicator.label()));
    match session {
        Some(session) => output.message(&format!(
            "Logged in: {} ({})",
            session.user.username, session.user.role
        )),
        None => output.message("Logged in: no"),
    }

    if pending.is_empty() {
        output.message("Queue:     empty");
    } else {
        output.message(&format!("Queue:     {} pending", pending.len()));
        for entry in &pending {
            output.message(&format!(
                "  {} {} {} (queued {})",
                entry.id,
                entry.call.method(),
                entry.endpoint,
                entry.timestamp.format("%Y-%m-%d %H:%M:%S")
            ));
        }
    }
    Ok(())
}
