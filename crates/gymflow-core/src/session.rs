//! Login session persistence
//!
//! Stores the backend-issued token between runs so the CLI does not have to
//! log in on every invocation. A 401 from the server invalidates the session;
//! the API client clears the store and the user is asked to log in again.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use crate::config::Config;

/// The session store as shared between the API client and the CLI
pub type SharedSessions = Arc<Mutex<SessionStore>>;

/// The user half of a login response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    /// "admin" or "superadmin"
    pub role: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// A logged-in session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl Session {
    /// Whether this session belongs to the owner role
    pub fn is_superadmin(&self) -> bool {
        self.user.role == "superadmin"
    }
}

/// Persistent session store
///
/// An absent or unreadable session file means "logged out", never an error.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: Option<Session>,
    /// Path to persist the session
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Create a new in-memory store (tests)
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the store at the configured session path
    pub fn open(config: &Config) -> Self {
        Self::with_path(config.session_path())
    }

    /// Wrap in the shared handle used across the client and CLI
    pub fn into_shared(self) -> SharedSessions {
        Arc::new(Mutex::new(self))
    }

    /// Open a store backed by a specific file, loading any existing session
    pub fn with_path(path: PathBuf) -> Self {
        let current = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Ignoring corrupt session file {:?}: {}", path, e);
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            current,
            path: Some(path),
        }
    }

    /// The current session, if logged in
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// The bearer token, if logged in
    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    /// Store a new session and persist it
    pub fn save(&mut self, session: Session) -> Result<()> {
        self.current = Some(session);

        let Some(ref path) = self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.current)?;
        fs::write(path, json).context("Failed to save session")?;
        Ok(())
    }

    /// Terminate the session and remove the persisted file
    pub fn clear(&mut self) {
        self.current = None;
        if let Some(ref path) = self.path {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    warn!("Failed to remove session file {:?}: {}", path, e);
                }
            }
        }
    }
}
