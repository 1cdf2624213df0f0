//! API call wrapper for the Graha Fitness backend
//!
//! Performs one HTTP request per logical operation and normalizes the outcome
//! into a small taxonomy:
//!
//! - success: the parsed JSON body
//! - auth-error (401): the local session is terminated
//! - permission-error (403): surfaced as a denial, call aborted
//! - application-error: any other non-success status, call aborted
//! - connectivity-failure: timeout or unreachable server; a *mutating* call
//!   is absorbed into the offline queue and reported as "queued" instead of
//!   failing
//!
//! Read calls are never queued; a connectivity failure on a read propagates.

mod client;
mod error;
mod request;

pub use client::ApiClient;
pub use error::ApiError;
pub use request::{ApiCall, CallOutcome, QueuedRequest};
