use tracing::{Span, field};

use super::TraceId;

/// Root span for one inbound request. `username` is recorded later by the
/// handler once the path has been extracted.
pub fn request_span(method: &str, path: &str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "request",
        method = %method,
        path = %path,
        trace_id = %trace_id,
        username = field::Empty,
        status = field::Empty
    )
}

/// Child span around a single store round-trip.
pub fn store_span(op: &'static str, username: &str) -> Span {
    tracing::debug_span!("store", op = op, username = %username)
}
