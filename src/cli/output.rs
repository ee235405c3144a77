//! CLI output: error mapping from SDK errors to a stable CLI surface.

use crate::error::ApiError;

/// Map SDK errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::NoActiveSession => {
            "No active session: set api.user_token in the config".to_string()
        }
        ApiError::HttpStatus { status, .. } => format!("Remote API returned HTTP {}", status),
        other => other.to_string(),
    }
}
