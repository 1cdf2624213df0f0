//! Sync engine
//!
//! Drains the offline queue against the server: each pending request is
//! replayed in enqueue order, failures are kept for the next pass, and the
//! visible indicator is recomputed from the result.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::api::{ApiCall, ApiError, QueuedRequest};
use crate::queue::SharedQueue;

/// The seam a drain pass replays entries through
///
/// Production implementation is `ApiClient`, which replays with queuing
/// disabled so a still-failing entry is not re-queued as a duplicate.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn replay(&self, endpoint: &str, call: &ApiCall) -> Result<Value, ApiError>;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    async fn replay(&self, endpoint: &str, call: &ApiCall) -> Result<Value, ApiError> {
        (**self).replay(endpoint, call).await
    }
}

/// Visible sync indicator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// No connectivity; mutating calls are being queued
    Offline,
    /// A drain pass is running
    Syncing,
    /// Online with queued requests awaiting replay
    Pending(usize),
    /// Online, nothing pending
    Online,
}

impl Indicator {
    /// Short label for display
    pub fn label(&self) -> String {
        match self {
            Indicator::Offline => "Offline".to_string(),
            Indicator::Syncing => "Syncing...".to_string(),
            Indicator::Pending(n) => format!("{} Pending", n),
            Indicator::Online => "Online".to_string(),
        }
    }

    fn from_state(state: ConnectivityState) -> Self {
        if !state.is_online {
            Indicator::Offline
        } else if state.pending_count > 0 {
            Indicator::Pending(state.pending_count)
        } else {
            Indicator::Online
        }
    }
}

/// Connectivity plus queue depth, derived on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityState {
    pub is_online: bool,
    pub pending_count: usize,
}

/// Events emitted by the sync engine
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The visible indicator changed
    IndicatorChanged(Indicator),
    /// A drain pass replayed at least one entry successfully; the active
    /// view should refresh
    DrainCompleted { succeeded: usize, remaining: usize },
}

/// Result of one drain pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Entries in the snapshot that was replayed
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Drains the offline queue when connectivity returns
pub struct SyncEngine<T: Transport> {
    transport: T,
    queue: SharedQueue,
    /// Live connectivity signal from the monitor
    online_rx: watch::Receiver<bool>,
    /// Indicator channel for observers
    indicator_tx: watch::Sender<Indicator>,
    indicator_rx: watch::Receiver<Indicator>,
    /// Event channel
    event_tx: mpsc::UnboundedSender<SyncEvent>,
    /// Event receiver
    event_rx: Option<mpsc::UnboundedReceiver<SyncEvent>>,
    /// True while a drain pass is running (the Syncing state)
    draining: AtomicBool,
}

impl<T: Transport> SyncEngine<T> {
    /// Create a new engine
    pub fn new(transport: T, queue: SharedQueue, online_rx: watch::Receiver<bool>) -> Self {
        let initial = if *online_rx.borrow() {
            Indicator::Online
        } else {
            Indicator::Offline
        };
        let (indicator_tx, indicator_rx) = watch::channel(initial);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            transport,
            queue,
            online_rx,
            indicator_tx,
            indicator_rx,
            event_tx,
            event_rx: Some(event_rx),
            draining: AtomicBool::new(false),
        }
    }

    /// Current connectivity signal
    pub fn is_online(&self) -> bool {
        *self.online_rx.borrow()
    }

    /// Current indicator state
    pub fn indicator(&self) -> Indicator {
        *self.indicator_rx.borrow()
    }

    /// Subscribe to indicator changes
    pub fn subscribe_indicator(&self) -> watch::Receiver<Indicator> {
        self.indicator_rx.clone()
    }

    /// Take the event receiver (can only be called once)
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SyncEvent>> {
        self.event_rx.take()
    }

    /// Derived connectivity + pending-count state
    pub async fn connectivity_state(&self) -> ConnectivityState {
        ConnectivityState {
            is_online: self.is_online(),
            pending_count: self.queue.lock().await.len(),
        }
    }

    /// Recompute the indicator from the live state
    ///
    /// While a drain pass is running it owns the indicator, so this is a
    /// no-op in the Syncing state.
    pub async fn refresh_indicator(&self) {
        if self.draining.load(Ordering::SeqCst) {
            return;
        }
        let state = self.connectivity_state().await;
        self.set_indicator(Indicator::from_state(state));
    }

    /// Run one drain pass over the queued requests
    ///
    /// Also the manual "sync now" entry point. Returns without touching
    /// anything when offline, when the queue is empty, or when a pass is
    /// already running: a second trigger has no observable effect.
    pub async fn drain(&self) -> DrainReport {
        if !self.is_online() {
            debug!("Drain skipped: offline");
            return DrainReport::default();
        }

        if self
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Drain skipped: already syncing");
            return DrainReport::default();
        }

        let snapshot = { self.queue.lock().await.snapshot() };
        if snapshot.is_empty() {
            self.draining.store(false, Ordering::SeqCst);
            return DrainReport::default();
        }

        info!("Syncing {} queued request(s)", snapshot.len());
        self.set_indicator(Indicator::Syncing);

        // Strict FIFO, sequential: entry N+1 does not start until entry N's
        // outcome is known. One entry's failure never aborts the pass.
        let mut failed: Vec<QueuedRequest> = Vec::new();
        let mut succeeded = 0usize;
        for entry in &snapshot {
            match self.transport.replay(&entry.endpoint, &entry.call).await {
                Ok(_) => {
                    debug!("Replayed {} {}", entry.call.method(), entry.endpoint);
                    succeeded += 1;
                }
                Err(e) => {
                    // Kept for the next pass regardless of failure class;
                    // replay does not distinguish terminal errors from
                    // transient ones
                    warn!(
                        "Replay of {} {} failed, keeping queued: {}",
                        entry.call.method(),
                        entry.endpoint,
                        e
                    );
                    failed.push(entry.clone());
                }
            }
        }

        let remaining = {
            let mut queue = self.queue.lock().await;
            // Anything enqueued while the pass was running survives it
            let late: Vec<QueuedRequest> = queue
                .list()
                .iter()
                .filter(|e| !snapshot.iter().any(|s| s.id == e.id && s.matches(&e.endpoint, &e.call)))
                .cloned()
                .collect();
            failed.extend(late);
            let remaining = failed.len();
            queue.replace(failed);
            remaining
        };

        let report = DrainReport {
            attempted: snapshot.len(),
            succeeded,
            failed: snapshot.len() - succeeded,
        };
        info!(
            "Sync pass done: {}/{} replayed, {} still pending",
            report.succeeded, report.attempted, remaining
        );

        if succeeded > 0 {
            let _ = self.event_tx.send(SyncEvent::DrainCompleted {
                succeeded,
                remaining,
            });
        }

        self.draining.store(false, Ordering::SeqCst);
        self.refresh_indicator().await;
        report
    }

    /// React to connectivity transitions until the monitor goes away
    ///
    /// Each offline-to-online transition triggers exactly one drain, not one
    /// per pending item. Going offline only updates the indicator.
    pub async fn run_on_transitions(&self) {
        let mut online_rx = self.online_rx.clone();
        self.refresh_indicator().await;

        while online_rx.changed().await.is_ok() {
            let online = *online_rx.borrow_and_update();
            if online {
                info!("Connection restored");
                self.refresh_indicator().await;
                self.drain().await;
            } else {
                info!("Connection lost, queuing mutations locally");
                self.refresh_indicator().await;
            }
        }
    }

    fn set_indicator(&self, indicator: Indicator) {
        let previous = self.indicator_tx.send_replace(indicator);
        if previous != indicator {
            let _ = self.event_tx.send(SyncEvent::IndicatorChanged(indicator));
        }
    }
}
