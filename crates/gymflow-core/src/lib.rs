//! GymFlow Core Library
//!
//! This crate provides the client-side core for GymFlow, the staff-facing
//! client of the Graha Fitness gym management backend.
//!
//! # Architecture
//!
//! The backend is plain REST; the interesting part of this client is that it
//! keeps accepting mutating operations (check-ins, member edits, transactions,
//! stock movements) while the server is unreachable. Those operations are
//! queued durably on disk and replayed in order once connectivity returns.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let sessions = SessionStore::open(&config);
//! let queue = OfflineQueue::with_path(config.queue_path());
//! let client = ApiClient::new(&config, sessions, queue.clone());
//!
//! // A check-in while offline comes back as CallOutcome::Queued
//! let outcome = client
//!     .call("/api/members/123/checkin", &ApiCall::Post(json!({})), false)
//!     .await?;
//! ```
//!
//! # Modules
//!
//! - `api`: request wrapper, outcome classification, error taxonomy
//! - `queue`: durable FIFO store of pending mutating requests
//! - `sync`: drain engine and connectivity monitor
//! - `session`: persisted login session
//! - `config`: application configuration

pub mod api;
pub mod config;
pub mod queue;
pub mod session;
pub mod sync;

pub use api::{ApiCall, ApiClient, ApiError, CallOutcome, QueuedRequest};
pub use config::Config;
pub use queue::{OfflineQueue, SharedQueue};
pub use session::{Session, SessionStore, SessionUser, SharedSessions};
pub use sync::{
    ConnectivityMonitor, ConnectivityProbe, ConnectivityState, DrainReport, Indicator,
    MonitorCommand, MonitorHandle, SyncEngine, SyncEvent, Transport,
};
