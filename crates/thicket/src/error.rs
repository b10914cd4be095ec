//! Error types for routing.

use thiserror::Error;

use crate::response::Response;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route was registered with no path segments.
    #[error("path cannot be empty")]
    EmptyPath,

    /// A catch-all `*` segment was followed by more segments.
    #[error("catch-all \"*\" must always be the final path element")]
    CatchAllNotLast,

    /// A `:name` segment references a pattern that was never added.
    #[error("missing regex for \"{0}\", use add_regex(\"{0}\", <pattern>) first")]
    UnknownPattern(String),

    /// Pattern names must start with a colon.
    #[error("pattern name must start with a colon ':', got \"{0}\"")]
    InvalidPatternName(String),

    /// The regular expression for a named pattern failed to compile.
    #[error("invalid regex for \"{name}\": {source}")]
    InvalidRegex {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// A method list contained something that is not an HTTP verb.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Router configuration could not be parsed.
    #[error("invalid router config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// No route matched the request.
    #[error("no route matched: {method} {path}")]
    NotFound { method: String, path: String },

    /// Method not allowed for this route.
    #[error("method not allowed: {method} for {path}")]
    MethodNotAllowed { method: String, path: String },
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;

/// Errors returned by fallible handlers.
///
/// See [`ErrorHandler`](crate::ErrorHandler) for how these become responses.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// An error that knows which status code it should produce.
    #[error("{message}")]
    Status { code: u16, message: String },

    /// Anything else; always answered with a 500.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Creates an error carrying an explicit status code.
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// Returns the status code this error maps to.
    pub fn code(&self) -> u16 {
        match self {
            Self::Status { code, .. } => *code,
            Self::Other(_) => 500,
        }
    }

    /// Converts the error into a plain-text response.
    ///
    /// Only status-carrying errors expose their message; anything else
    /// gets the generic status text so internals do not leak.
    pub fn into_response(self) -> Response {
        match self {
            Self::Status { code, message } => Response::error(code, message),
            Self::Other(_) => Response::internal_server_error(),
        }
    }
}
