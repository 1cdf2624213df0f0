//! Long-running watch mode
//!
//! Runs the connectivity monitor and sync engine together and prints
//! indicator changes and drain results until interrupted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use gymflow_core::{ApiClient, Config, ConnectivityMonitor, MonitorCommand, SyncEngine, SyncEvent};

use crate::output::Output;

/// Monitor connectivity and replay the queue on every recovery
pub async fn run(config: &Config, client: Arc<ApiClient>, output: &Output) -> Result<()> {
    let interval = Duration::from_secs(config.probe_interval_secs);
    let (monitor, handle) = ConnectivityMonitor::new(client.clone(), interval);

    let mut engine = SyncEngine::new(client.clone(), client.queue(), handle.online_rx.clone());
    let mut events = match engine.take_events() {
        Some(events) => events,
        None => anyhow::bail!("Sync events already consumed"),
    };

    let engine = Arc::new(engine);
    let monitor_task = tokio::spawn(monitor.run());
    let engine_task = tokio::spawn({
        let engine = engine.clone();
        async move { engine.run_on_transitions().await }
    });

    output.message(&format!(
        "Watching {} (probe every {}s), Ctrl-C to stop",
        config.server_url, config.probe_interval_secs
    ));
    output.message(&format!("[{}]", engine.indicator().label()));

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(SyncEvent::IndicatorChanged(indicator)) => {
                        output.message(&format!("[{}]", indicator.label()));
                    }
                    Some(SyncEvent::DrainCompleted { succeeded, remaining }) => {
                        if remaining > 0 {
                            output.message(&format!(
                                "Synced {} request(s), {} still pending",
                                succeeded, remaining
                            ));
                        } else {
                            output.success(&format!("Synced {} request(s)", succeeded));
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                output.message("Stopping...");
                break;
            }
        }
    }

    let _ = handle.command_tx.send(MonitorCommand::Shutdown).await;
    let _ = monitor_task.await;
    engine_task.abort();
    Ok(())
}
