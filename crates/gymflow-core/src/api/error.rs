//! API error taxonomy
//!
//! None of these are fatal to the process: auth errors force a re-login,
//! permission and application errors abort the single call, and connectivity
//! failures on mutating calls are absorbed into the offline queue before this
//! type is ever surfaced.

use thiserror::Error;

/// Errors produced by the API call wrapper
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 - the session is invalid; the local session has been terminated
    #[error("Session expired: {message}. Please log in again.")]
    Auth { message: String },

    /// 403 - authenticated but not allowed
    #[error("Permission denied: {message}")]
    Permission { message: String },

    /// Any other non-success status (validation, business rule, not found)
    #[error("Request failed ({status}): {message}")]
    Application { status: u16, message: String },

    /// Timeout, offline, or unreachable server
    #[error("Cannot reach server: {reason}")]
    Connectivity { reason: String },

    /// Response body could not be parsed
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether this failure is a connectivity failure (queue-eligible for
    /// mutating calls)
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Connectivity { .. })
    }

    /// Classify a transport-level reqwest error
    ///
    /// Timeouts, connection failures, and request-send failures all count as
    /// connectivity failures; anything else surfaces as an invalid response.
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() || error.is_request() {
            ApiError::Connectivity {
                reason: error.to_string(),
            }
        } else {
            ApiError::InvalidResponse(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_classification() {
        let err = ApiError::Connectivity {
            reason: "connection refused".to_string(),
        };
        assert!(err.is_connectivity());

        let err = ApiError::Application {
            status: 400,
            message: "Membership expired".to_string(),
        };
        assert!(!err.is_connectivity());
    }

    #[test]
    fn test_display_messages() {
        let err = ApiError::Auth {
            message: "token expired".to_string(),
        };
        assert!(format!("{}", err).contains("log in again"));

        let err = ApiError::Application {
            status: 404,
            message: "Member not found".to_string(),
        };
        assert_eq!(format!("{}", err), "Request failed (404): Member not found");
    }
}
