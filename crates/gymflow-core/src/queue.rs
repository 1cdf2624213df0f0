//! Offline queue store
//!
//! Durable FIFO list of pending mutating requests. The queue survives process
//! restarts and has no expiry: an entry stays until the sync engine confirms
//! a successful replay. A corrupt or missing queue file is treated as an
//! empty queue.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::{ApiCall, QueuedRequest};

/// The queue as shared between the API client and the sync engine
pub type SharedQueue = Arc<Mutex<OfflineQueue>>;

/// Durable FIFO store of queued requests
///
/// Replay order equals enqueue order: later edits to the same entity may
/// depend on earlier ones having been applied first.
#[derive(Debug, Default)]
pub struct OfflineQueue {
    entries: Vec<QueuedRequest>,
    /// Path to persist the queue
    path: Option<PathBuf>,
}

impl OfflineQueue {
    /// Create a new in-memory queue (tests)
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a queue backed by a file, loading any persisted entries
    ///
    /// An unreadable or unparsable file is logged and treated as empty.
    pub fn with_path(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring corrupt offline queue {:?}: {}", path, e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self {
            entries,
            path: Some(path),
        }
    }

    /// Wrap in the shared handle used across the client and engine
    pub fn into_shared(self) -> SharedQueue {
        Arc::new(Mutex::new(self))
    }

    /// Append a request unless an identical one is already pending
    ///
    /// Returns false for a suppressed duplicate (same endpoint and same
    /// structural call). This bounds growth from repeated clicks, e.g. a
    /// double check-in while offline.
    pub fn enqueue(&mut self, endpoint: &str, call: ApiCall) -> bool {
        if self.entries.iter().any(|e| e.matches(endpoint, &call)) {
            debug!("Duplicate offline entry suppressed: {}", endpoint);
            return false;
        }

        let entry = QueuedRequest::new(endpoint, call);
        debug!("Queued {} {} for later replay", entry.call.method(), endpoint);
        self.entries.push(entry);
        self.persist();
        true
    }

    /// The pending entries in replay order
    pub fn list(&self) -> &[QueuedRequest] {
        &self.entries
    }

    /// Snapshot of the pending entries for a drain pass
    pub fn snapshot(&self) -> Vec<QueuedRequest> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove exactly one entry by id (first match)
    pub fn remove(&mut self, id: i64) {
        if let Some(pos) = self.entries.iter().position(|e| e.id == id) {
            self.entries.remove(pos);
            self.persist();
        }
    }

    /// Overwrite the queue with the entries that survived a drain pass
    pub fn replace(&mut self, entries: Vec<QueuedRequest>) {
        self.entries = entries;
        self.persist();
    }

    /// Drop everything (explicit operator action)
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Write the current entries to disk, logging failures
    ///
    /// Persistence failures must not turn a queued call into a lost one, so
    /// the in-memory queue is kept authoritative for this process.
    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("Failed to persist offline queue: {}", e);
        }
    }

    fn save(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, json).context("Failed to save offline queue")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_enqueue_preserves_order() {
        let mut queue = OfflineQueue::new();

        queue.enqueue("/api/members", ApiCall::Post(json!({"name": "A"})));
        queue.enqueue("/api/members/1", ApiCall::Put(json!({"name": "B"})));
        queue.enqueue("/api/members/1/checkin", ApiCall::Post(json!({})));

        let endpoints: Vec<_> = queue.list().iter().map(|e| e.endpoint.as_str()).collect();
        assert_eq!(
            endpoints,
            ["/api/members", "/api/members/1", "/api/members/1/checkin"]
        );
    }

    #[test]
    fn test_duplicate_enqueue_is_noop() {
        let mut queue = OfflineQueue::new();

        assert!(queue.enqueue("/api/members/123", ApiCall::Put(json!({"name": "A"}))));
        assert!(!queue.enqueue("/api/members/123", ApiCall::Put(json!({"name": "A"}))));
        assert_eq!(queue.len(), 1);

        // A different body is a new entry
        assert!(queue.enqueue("/api/members/123", ApiCall::Put(json!({"name": "B"}))));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_persistence_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("queue.json");

        {
            let mut queue = OfflineQueue::with_path(path.clone());
            queue.enqueue("/api/members/123/checkin", ApiCall::Post(json!({})));
            queue.enqueue("/api/transactions", ApiCall::Post(json!({"amount": 50})));
        }

        let queue = OfflineQueue::with_path(path);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.list()[0].endpoint, "/api/members/123/checkin");
        assert_eq!(queue.list()[1].endpoint, "/api/transactions");
    }

    #[test]
    fn test_corrupt_file_is_empty_queue() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("queue.json");
        fs::write(&path, "[{broken").unwrap();

        let queue = OfflineQueue::with_path(path);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_missing_file_is_empty_queue() {
        let temp_dir = TempDir::new().unwrap();
        let queue = OfflineQueue::with_path(temp_dir.path().join("nope.json"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_by_id() {
        let mut queue = OfflineQueue::new();
        queue.enqueue("/api/a", ApiCall::Delete);
        queue.enqueue("/api/b", ApiCall::Delete);

        let id = queue.list()[0].id;
        queue.remove(id);

        // Removing an unknown id is a no-op
        queue.remove(-1);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.list()[0].endpoint, "/api/b");
    }

    #[test]
    fn test_replace_persists_survivors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("queue.json");

        let mut queue = OfflineQueue::with_path(path.clone());
        queue.enqueue("/api/a", ApiCall::Delete);
        queue.enqueue("/api/b", ApiCall::Delete);
        queue.enqueue("/api/c", ApiCall::Delete);

        let survivors = vec![queue.list()[1].clone()];
        queue.replace(survivors);

        let reopened = OfflineQueue::with_path(path);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.list()[0].endpoint, "/api/b");
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("queue.json");

        let mut queue = OfflineQueue::with_path(path.clone());
        queue.enqueue("/api/a", ApiCall::Delete);
        queue.clear();
        assert!(queue.is_empty());

        let reopened = OfflineQueue::with_path(path);
        assert!(reopened.is_empty());
    }
}
