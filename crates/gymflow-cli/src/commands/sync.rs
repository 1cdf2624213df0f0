//! One-shot sync command

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;

use gymflow_core::{ApiClient, ConnectivityProbe, SyncEngine};

use crate::output::Output;

/// Probe the server once and replay the offline queue
pub async fn sync_now(client: &Arc<ApiClient>, output: &Output) -> Result<()> {
    let pending = client.queue().lock().await.len();
    if pending == 0 {
        output.message("Nothing to sync.");
        return Ok(());
    }

    output.message(&format!("Syncing {} pending request(s)...", pending));

    let online = client.check().await;
    let (online_tx, online_rx) = watch::channel(online);
    let engine = SyncEngine::new(client.clone(), client.queue(), online_rx);

    if !online {
        anyhow::bail!("Server unreachable, {} request(s) still pending", pending);
    }

    let report = engine.drain().await;
    drop(online_tx);

    if report.failed > 0 {
        output.message(&format!(
            "Synced {} of {}, {} still pending",
            report.succeeded, report.attempted, report.failed
        ));
    } else {
        output.success(&format!("Synced {} request(s)", report.succeeded));
    }
    Ok(())
}
