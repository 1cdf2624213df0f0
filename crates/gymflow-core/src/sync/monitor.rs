//! Connectivity monitor
//!
//! Probes the server on an interval and publishes online/offline transitions
//! on a `watch` channel. Draining on recovery is the engine's job; the
//! monitor only reports the signal.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::info;

/// The connectivity signal source
///
/// Production implementation is `ApiClient` hitting `/api/health`; tests use
/// a scripted probe.
#[allow(async_fn_in_trait)]
pub trait ConnectivityProbe {
    /// True when the server is reachable right now
    async fn check(&self) -> bool;
}

impl<P: ConnectivityProbe> ConnectivityProbe for std::sync::Arc<P> {
    async fn check(&self) -> bool {
        (**self).check().await
    }
}

/// Commands sent to the monitor task
#[derive(Debug)]
pub enum MonitorCommand {
    /// Probe immediately instead of waiting out the interval
    ProbeNow,
    /// Shutdown the monitor task
    Shutdown,
}

/// Handle to control and observe the monitor
pub struct MonitorHandle {
    /// Send commands to the monitor task
    pub command_tx: mpsc::Sender<MonitorCommand>,
    /// Watch the connectivity signal; starts offline until the first probe
    pub online_rx: watch::Receiver<bool>,
}

/// Periodic connectivity prober
pub struct ConnectivityMonitor<P: ConnectivityProbe> {
    probe: P,
    interval: Duration,
    online_tx: watch::Sender<bool>,
    command_rx: mpsc::Receiver<MonitorCommand>,
}

impl<P: ConnectivityProbe> ConnectivityMonitor<P> {
    /// Create a monitor and its handle
    ///
    /// The caller spawns [`ConnectivityMonitor::run`] on the runtime; the
    /// signal starts as offline and corrects itself on the first probe.
    pub fn new(probe: P, interval: Duration) -> (Self, MonitorHandle) {
        let (online_tx, online_rx) = watch::channel(false);
        let (command_tx, command_rx) = mpsc::channel(16);

        (
            Self {
                probe,
                interval,
                online_tx,
                command_rx,
            },
            MonitorHandle {
                command_tx,
                online_rx,
            },
        )
    }

    /// Probe loop; publishes only actual transitions
    ///
    /// Runs until a shutdown command arrives or the handle is dropped.
    pub async fn run(mut self) {
        loop {
            let online = self.probe.check().await;
            let changed = self.online_tx.send_if_modified(|current| {
                if *current != online {
                    *current = online;
                    true
                } else {
                    false
                }
            });
            if changed {
                info!(
                    "Connectivity: {}",
                    if online { "online" } else { "offline" }
                );
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(MonitorCommand::ProbeNow) => {}
                        Some(MonitorCommand::Shutdown) | None => break,
                    }
                }
            }
        }
    }
}
