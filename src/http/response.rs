//! Response overlay helpers.
//!
//! # Responsibilities
//! - Apply accumulated routing headers onto a served response (set, not
//!   merge: a routing header replaces whatever the entry produced)
//! - Replace the response status with an accumulated one

use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

/// Set every header from `headers` on the response, overwriting existing
/// values for the same (case-folded) name.
pub fn apply_headers(response: &mut Response, headers: &HeaderMap) {
    for (name, value) in headers {
        response.headers_mut().insert(name.clone(), value.clone());
    }
}

/// Replace the response status.
pub fn apply_status(response: &mut Response, status: StatusCode) {
    *response.status_mut() = status;
}
