//! Typed call descriptions
//!
//! A call is a method variant carrying its JSON body. Duplicate detection in
//! the offline queue uses structural equality over this representation, not
//! string comparison of serialized bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One API call: HTTP method plus body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "body")]
pub enum ApiCall {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post(Value),
    #[serde(rename = "PUT")]
    Put(Value),
    #[serde(rename = "DELETE")]
    Delete,
}

impl ApiCall {
    /// Whether this call changes server state (create/update/delete)
    ///
    /// Only mutating calls are eligible for offline queuing.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, ApiCall::Get)
    }

    /// Method name for logging
    pub fn method(&self) -> &'static str {
        match self {
            ApiCall::Get => "GET",
            ApiCall::Post(_) => "POST",
            ApiCall::Put(_) => "PUT",
            ApiCall::Delete => "DELETE",
        }
    }
}

/// One pending mutating operation in the offline queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedRequest {
    /// Millisecond timestamp at enqueue time; collisions are tolerated
    pub id: i64,
    /// Resource path, no host or scheme (e.g. "/api/members/123/checkin")
    pub endpoint: String,
    /// The captured call, replayed verbatim
    pub call: ApiCall,
    /// Creation time, informational only
    pub timestamp: DateTime<Utc>,
}

impl QueuedRequest {
    pub fn new(endpoint: &str, call: ApiCall) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis(),
            endpoint: endpoint.to_string(),
            call,
            timestamp: now,
        }
    }

    /// Structural fingerprint match: same endpoint, same call
    pub fn matches(&self, endpoint: &str, call: &ApiCall) -> bool {
        self.endpoint == endpoint && self.call == *call
    }
}

/// Result of a call that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The parsed response body
    Success(Value),
    /// The call could not reach the server and was queued for later replay
    Queued { message: String },
}

impl CallOutcome {
    /// The response body for a confirmed success, if any
    pub fn body(&self) -> Option<&Value> {
        match self {
            CallOutcome::Success(body) => Some(body),
            CallOutcome::Queued { .. } => None,
        }
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, CallOutcome::Queued { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mutating_calls() {
        assert!(!ApiCall::Get.is_mutating());
        assert!(ApiCall::Post(json!({})).is_mutating());
        assert!(ApiCall::Put(json!({"name": "A"})).is_mutating());
        assert!(ApiCall::Delete.is_mutating());
    }

    #[test]
    fn test_structural_fingerprint() {
        let entry = QueuedRequest::new("/api/members/123", ApiCall::Put(json!({"name": "A"})));

        assert!(entry.matches("/api/members/123", &ApiCall::Put(json!({"name": "A"}))));
        // Different body, different endpoint, different method all miss
        assert!(!entry.matches("/api/members/123", &ApiCall::Put(json!({"name": "B"}))));
        assert!(!entry.matches("/api/members/456", &ApiCall::Put(json!({"name": "A"}))));
        assert!(!entry.matches("/api/members/123", &ApiCall::Post(json!({"name": "A"}))));
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        // Structural equality, not byte comparison of serialized JSON
        let a = ApiCall::Post(json!({"name": "A", "plan": "monthly"}));
        let b = ApiCall::Post(json!({"plan": "monthly", "name": "A"}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_queued_request_roundtrip() {
        let entry = QueuedRequest::new("/api/members/123/checkin", ApiCall::Post(json!({})));

        let json = serde_json::to_string(&entry).unwrap();
        let restored: QueuedRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id, entry.id);
        assert_eq!(restored.endpoint, entry.endpoint);
        assert_eq!(restored.call, entry.call);
    }

    #[test]
    fn test_call_serialization_shape() {
        let json = serde_json::to_value(ApiCall::Put(json!({"name": "A"}))).unwrap();
        assert_eq!(json["method"], "PUT");
        assert_eq!(json["body"]["name"], "A");

        let json = serde_json::to_value(ApiCall::Delete).unwrap();
        assert_eq!(json["method"], "DELETE");
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = CallOutcome::Success(json!({"status": "created"}));
        assert!(!ok.is_queued());
        assert_eq!(ok.body().unwrap()["status"], "created");

        let queued = CallOutcome::Queued {
            message: "Saved offline".to_string(),
        };
        assert!(queued.is_queued());
        assert!(queued.body().is_none());
    }
}
