//! Request logging.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::request::{Method, Request};
use crate::response::Response;

/// What the router observed about one served request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLog {
    pub method: Method,
    pub path: String,
    /// Status code of the response that was sent.
    pub status: u16,
    /// Response body size in bytes.
    pub size: usize,
    /// Time from dispatch to the handler's response.
    pub elapsed: Duration,
    pub request_id: Option<String>,
}

impl RequestLog {
    pub fn new(
        request: &Request,
        response: &Response,
        elapsed: Duration,
        request_id: Option<String>,
    ) -> Self {
        Self {
            method: request.method,
            path: request.path.clone(),
            status: response.status,
            size: response.size(),
            elapsed,
            request_id,
        }
    }
}

/// Receives a record for every request when logging is enabled.
pub type LogSink = Arc<dyn Fn(&RequestLog, &Request) + Send + Sync>;

/// The default sink: one `tracing` event per request.
pub fn trace_request(log: &RequestLog, _request: &Request) {
    info!(
        method = %log.method,
        path = %log.path,
        status = log.status,
        size = log.size,
        elapsed_us = u64::try_from(log.elapsed.as_micros()).unwrap_or(u64::MAX),
        request_id = log.request_id.as_deref().unwrap_or("-"),
        "request served"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture() {
        let req = Request::post("/items?x=1");
        let res = Response::text("created").status(201);
        let log = RequestLog::new(&req, &res, Duration::from_millis(3), Some("abc".into()));

        assert_eq!(log.method, Method::Post);
        assert_eq!(log.path, "/items");
        assert_eq!(log.status, 201);
        assert_eq!(log.size, 7);
        assert_eq!(log.request_id.as_deref(), Some("abc"));

        // No subscriber installed; must not panic.
        trace_request(&log, &req);
    }
}
