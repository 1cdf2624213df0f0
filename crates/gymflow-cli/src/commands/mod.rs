//! Command handlers

pub mod attendance;
pub mod login;
pub mod member;
pub mod report;
pub mod status;
pub mod stock;
pub mod sync;
pub mod transaction;
pub mod watch;

use serde_json::json;

use gymflow_core::CallOutcome;

use crate::output::{Output, OutputFormat};

/// Print the outcome of a mutating call.
///
/// Successful calls print the server response; queued calls print the
/// offline message so staff know the write is pending, not lost.
pub fn report_outcome(outcome: &CallOutcome, success_message: &str, output: &Output) {
    match outcome {
        CallOutcome::Success(value) => {
            output.success(success_message);
            if !value.is_null() {
                output.print_value(value);
            }
        }
        CallOutcome::Queued { message } => {
            if output.format == OutputFormat::Json {
                output.print_value(&json!({ "queued": true, "detail": message }));
            } else {
                output.message(message);
            }
        }
    }
}
