//! API client implementation
//!
//! One `reqwest` call per logical operation, with a bounded timeout and the
//! offline-queue side effect for mutating calls that cannot reach the server.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Response;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{ApiCall, ApiError, CallOutcome};
use crate::config::Config;
use crate::queue::SharedQueue;
use crate::session::{Session, SharedSessions};
use crate::sync::{ConnectivityProbe, Transport};

/// Message returned with the queued pseudo-result
const QUEUED_MESSAGE: &str = "Saved offline. Will sync when the connection returns.";

/// Fallback when the server supplies no error detail
const GENERIC_FAILURE: &str = "Request failed. Please try again.";

/// Timeout for connectivity probes, much shorter than a real call
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// The login endpoint gets special 401 treatment
const LOGIN_ENDPOINT: &str = "/api/login";

/// API call wrapper for the Graha Fitness backend
pub struct ApiClient {
    /// HTTP client with the bounded per-request timeout applied
    http: reqwest::Client,
    /// Base URL, no trailing slash
    base_url: String,
    /// Shared login session; cleared on auth errors
    sessions: SharedSessions,
    /// Shared offline queue; appended to on connectivity failures
    queue: SharedQueue,
}

impl ApiClient {
    /// Create a client for the configured server
    pub fn new(config: &Config, sessions: SharedSessions, queue: SharedQueue) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            sessions,
            queue,
        })
    }

    /// The shared queue handle (for the sync engine and indicator)
    pub fn queue(&self) -> SharedQueue {
        self.queue.clone()
    }

    /// The shared session store handle
    pub fn sessions(&self) -> SharedSessions {
        self.sessions.clone()
    }

    /// Perform one API call and classify its outcome
    ///
    /// `skip_queue` suppresses the offline-queue side effect for this attempt;
    /// the sync engine sets it during replay so a still-failing entry is not
    /// re-queued as a duplicate. With `skip_queue` set, the returned outcome
    /// is always `Success`.
    pub async fn call(
        &self,
        endpoint: &str,
        call: &ApiCall,
        skip_queue: bool,
    ) -> Result<CallOutcome, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = match call {
            ApiCall::Get => self.http.get(&url),
            ApiCall::Post(body) => self.http.post(&url).json(body),
            ApiCall::Put(body) => self.http.put(&url).json(body),
            ApiCall::Delete => self.http.delete(&url),
        };

        let token = { self.sessions.lock().await.token().map(str::to_string) };
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::from_transport(e);
                if err.is_connectivity() && call.is_mutating() && !skip_queue {
                    info!("{} {} unreachable, queuing for replay", call.method(), endpoint);
                    self.queue.lock().await.enqueue(endpoint, call.clone());
                    return Ok(CallOutcome::Queued {
                        message: QUEUED_MESSAGE.to_string(),
                    });
                }
                debug!("{} {} failed: {}", call.method(), endpoint, err);
                return Err(err);
            }
        };

        self.classify(endpoint, response).await
    }

    /// Convenience wrapper for read calls
    pub async fn get(&self, endpoint: &str) -> Result<Value, ApiError> {
        match self.call(endpoint, &ApiCall::Get, false).await? {
            CallOutcome::Success(body) => Ok(body),
            // Read calls are never queued
            CallOutcome::Queued { .. } => Err(ApiError::InvalidResponse(
                "read call reported as queued".to_string(),
            )),
        }
    }

    /// Convenience wrapper for mutating calls, queue-eligible
    pub async fn post(&self, endpoint: &str, body: Value) -> Result<CallOutcome, ApiError> {
        self.call(endpoint, &ApiCall::Post(body), false).await
    }

    pub async fn put(&self, endpoint: &str, body: Value) -> Result<CallOutcome, ApiError> {
        self.call(endpoint, &ApiCall::Put(body), false).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<CallOutcome, ApiError> {
        self.call(endpoint, &ApiCall::Delete, false).await
    }

    /// Log in and persist the returned session
    ///
    /// A login is never queued: replaying stale credentials later is not
    /// meaningful, so a connectivity failure here propagates to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let body = json!({ "username": username, "password": password });
        let outcome = self.call(LOGIN_ENDPOINT, &ApiCall::Post(body), true).await?;

        let Some(body) = outcome.body() else {
            return Err(ApiError::InvalidResponse("empty login response".to_string()));
        };

        let session: Session = serde_json::from_value(body.clone())
            .map_err(|e| ApiError::InvalidResponse(format!("malformed login response: {}", e)))?;

        let mut sessions = self.sessions.lock().await;
        if let Err(e) = sessions.save(session.clone()) {
            warn!("Session not persisted: {}", e);
        }
        Ok(session)
    }

    /// Drop the local session
    pub async fn logout(&self) {
        self.sessions.lock().await.clear();
    }

    /// Fetch a binary report export
    ///
    /// A read call: connectivity failures always propagate, nothing is
    /// queued.
    pub async fn download(&self, endpoint: &str) -> Result<Vec<u8>, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.http.get(&url);

        let token = { self.sessions.lock().await.token().map(str::to_string) };
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        if status.is_success() {
            return response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| ApiError::InvalidResponse(e.to_string()));
        }

        Err(self.error_for(endpoint, status.as_u16(), response).await)
    }

    /// Classify an HTTP response per the error taxonomy
    async fn classify(&self, endpoint: &str, response: Response) -> Result<CallOutcome, ApiError> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .json()
                .await
                .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
            return Ok(CallOutcome::Success(body));
        }

        Err(self.error_for(endpoint, status.as_u16(), response).await)
    }

    /// Map a non-success status to the error taxonomy
    async fn error_for(&self, endpoint: &str, status: u16, response: Response) -> ApiError {
        let message = error_detail(response).await;
        match status {
            // A 401 from login means the credentials were rejected; any
            // stored session is not implicated and stays intact
            401 if endpoint == LOGIN_ENDPOINT => ApiError::Application {
                status: 401,
                message,
            },
            401 => {
                // Session is invalid; terminate it locally
                warn!("Session rejected by server ({}), logging out", endpoint);
                self.sessions.lock().await.clear();
                ApiError::Auth { message }
            }
            403 => ApiError::Permission { message },
            code => ApiError::Application {
                status: code,
                message,
            },
        }
    }
}

/// Extract the backend's error message, if any
///
/// The backend reports errors as `{"detail": "..."}`.
async fn error_detail(response: Response) -> String {
    match response.json::<Value>().await {
        Ok(body) => body
            .get("detail")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        Err(_) => GENERIC_FAILURE.to_string(),
    }
}

impl Transport for ApiClient {
    /// Replay a queued entry with queuing disabled
    async fn replay(&self, endpoint: &str, call: &ApiCall) -> Result<Value, ApiError> {
        match self.call(endpoint, call, true).await? {
            CallOutcome::Success(body) => Ok(body),
            // skip_queue suppresses queuing, so this cannot occur
            CallOutcome::Queued { .. } => Err(ApiError::Connectivity {
                reason: "replay attempt was queued".to_string(),
            }),
        }
    }
}

impl ConnectivityProbe for ApiClient {
    /// One cheap unauthenticated request against the health endpoint
    async fn check(&self) -> bool {
        self.http
            .get(format!("{}/api/health", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::OfflineQueue;
    use crate::session::{SessionStore, SessionUser};
    use httpmock::Method::{GET, POST, PUT};
    use httpmock::MockServer;

    fn test_client(server_url: &str) -> ApiClient {
        let config = Config {
            server_url: server_url.to_string(),
            request_timeout_secs: 5,
            ..Config::default()
        };
        ApiClient::new(
            &config,
            SessionStore::new().into_shared(),
            OfflineQueue::new().into_shared(),
        )
        .unwrap()
    }

    async fn log_in(client: &ApiClient, token: &str) {
        let session = Session {
            token: token.to_string(),
            user: SessionUser {
                id: "u1".to_string(),
                username: "staff".to_string(),
                role: "admin".to_string(),
                display_name: "Front Desk".to_string(),
            },
        };
        client.sessions.lock().await.save(session).unwrap();
    }

    /// A base URL nothing listens on; connections are refused immediately
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn test_success_returns_parsed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/health");
                then.status(200).json_body(serde_json::json!({"status": "ok"}));
            })
            .await;

        let client = test_client(&server.base_url());
        let body = client.get("/api/health").await.unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/members")
                    .header("authorization", "Bearer tok-1");
                then.status(200).json_body(serde_json::json!([]));
            })
            .await;

        let client = test_client(&server.base_url());
        log_in(&client, "tok-1").await;

        client.get("/api/members").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_application_error_uses_server_detail() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/members/1/checkin");
                then.status(400)
                    .json_body(serde_json::json!({"detail": "Membership expired"}));
            })
            .await;

        let client = test_client(&server.base_url());
        let err = client
            .post("/api/members/1/checkin", serde_json::json!({}))
            .await
            .unwrap_err();

        match err {
            ApiError::Application { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Membership expired");
            }
            other => panic!("expected application error, got {:?}", other),
        }
        // Application errors are never queued
        assert!(client.queue.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_auth_error_clears_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/members");
                then.status(401)
                    .json_body(serde_json::json!({"detail": "Invalid token"}));
            })
            .await;

        let client = test_client(&server.base_url());
        log_in(&client, "stale").await;

        let err = client.get("/api/members").await.unwrap_err();
        assert!(matches!(err, ApiError::Auth { .. }));
        assert!(!client.sessions.lock().await.is_logged_in());
    }

    #[tokio::test]
    async fn test_permission_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::DELETE).path("/api/transactions/t1");
                then.status(403)
                    .json_body(serde_json::json!({"detail": "Superadmin access required"}));
            })
            .await;

        let client = test_client(&server.base_url());
        let err = client.delete("/api/transactions/t1").await.unwrap_err();
        assert!(matches!(err, ApiError::Permission { .. }));
        // The session survives a permission denial
        assert!(client.queue.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_mutating_call_is_queued() {
        let client = test_client(UNREACHABLE);

        let outcome = client
            .post("/api/members/123/checkin", serde_json::json!({}))
            .await
            .unwrap();

        assert!(outcome.is_queued());
        let queue = client.queue.lock().await;
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.list()[0].endpoint, "/api/members/123/checkin");
    }

    #[tokio::test]
    async fn test_unreachable_read_call_propagates() {
        let client = test_client(UNREACHABLE);

        let err = client.get("/api/members").await.unwrap_err();
        assert!(err.is_connectivity());
        assert!(client.queue.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_skip_queue_suppresses_queuing() {
        let client = test_client(UNREACHABLE);

        let err = client
            .call(
                "/api/members/123",
                &ApiCall::Put(serde_json::json!({"name": "A"})),
                true,
            )
            .await
            .unwrap_err();

        assert!(err.is_connectivity());
        assert!(client.queue.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/login");
                then.status(200).json_body(serde_json::json!({
                    "token": "tok-9",
                    "user": {
                        "id": "u1",
                        "username": "owner",
                        "role": "superadmin",
                        "displayName": "Owner"
                    }
                }));
            })
            .await;

        let client = test_client(&server.base_url());
        let session = client.login("owner", "secret").await.unwrap();

        assert!(session.is_superadmin());
        assert_eq!(client.sessions.lock().await.token(), Some("tok-9"));
    }

    #[tokio::test]
    async fn test_login_rejection_keeps_existing_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/login");
                then.status(401)
                    .json_body(serde_json::json!({"detail": "Invalid username or password"}));
            })
            .await;

        let client = test_client(&server.base_url());
        log_in(&client, "tok-1").await;

        let err = client.login("owner", "wrong").await.unwrap_err();

        // Bad credentials are an application error, not an expired session
        match err {
            ApiError::Application { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid username or password");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(client.sessions.lock().await.token(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_login_offline_is_not_queued() {
        let client = test_client(UNREACHABLE);

        let err = client.login("owner", "secret").await.unwrap_err();
        assert!(err.is_connectivity());
        assert!(client.queue.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_replay_uses_skip_queue() {
        let client = test_client(UNREACHABLE);

        let err = client
            .replay("/api/members/1", &ApiCall::Delete)
            .await
            .unwrap_err();

        assert!(err.is_connectivity());
        assert!(client.queue.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_probe_check() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/health");
                then.status(200).json_body(serde_json::json!({"status": "ok"}));
            })
            .await;

        let client = test_client(&server.base_url());
        assert!(client.check().await);

        let offline = test_client(UNREACHABLE);
        assert!(!offline.check().await);
    }

    #[tokio::test]
    async fn test_generic_message_without_detail() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/stock/s1");
                then.status(500).body("boom");
            })
            .await;

        let client = test_client(&server.base_url());
        let err = client
            .put("/api/stock/s1", serde_json::json!({"quantity": 2}))
            .await
            .unwrap_err();

        match err {
            ApiError::Application { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, GENERIC_FAILURE);
            }
            other => panic!("expected application error, got {:?}", other),
        }
    }
}
