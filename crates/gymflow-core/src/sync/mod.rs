//! Offline synchronization
//!
//! Two cooperating pieces:
//!
//! - [`ConnectivityMonitor`]: probes the server on an interval and publishes
//!   online/offline transitions on a `watch` channel.
//! - [`SyncEngine`]: reacts to an offline-to-online transition (or a manual
//!   "sync now" trigger) by draining the offline queue, replaying entries in
//!   FIFO order with per-entry failure isolation.
//!
//! ## Drain state machine
//!
//! `Idle --(triggered, queue non-empty, online)--> Syncing --(pass done)--> Idle`
//!
//! A trigger while `Syncing` is a no-op; at most one drain runs at a time.

mod engine;
mod monitor;

pub use engine::{
    ConnectivityState, DrainReport, Indicator, SyncEngine, SyncEvent, Transport,
};
pub use monitor::{ConnectivityMonitor, ConnectivityProbe, MonitorCommand, MonitorHandle};
