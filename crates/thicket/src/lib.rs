//! # thicket
//!
//! A request router built on a segment trie.
//!
//! This crate provides:
//! - Static, regex-checked (`:name`) and catch-all (`*`) path segments
//! - Method lists per route, with `ALL` as the default
//! - API versioning through `application/vnd.<app>.<version>` headers
//! - Named routes, panic recovery and optional request logging
//! - Middleware chains
//!
//! ## Quick Start
//!
//! ```ignore
//! use thicket::{Request, Response, Router};
//!
//! async fn hello_handler(_req: Request) -> Response {
//!     Response::text("Hello, World!")
//! }
//!
//! async fn user_handler(req: Request) -> Response {
//!     let id = req.params.get(":uuid").unwrap_or("unknown");
//!     Response::json(&serde_json::json!({"id": id}))
//! }
//!
//! let mut router = Router::new();
//! router.add_regex(":uuid", "[0-9a-fA-F-]{36}")?;
//! router.handle("/", hello_handler, "GET,HEAD")?;
//! router.handle("/users/:uuid", user_handler, "GET")?;
//!
//! let response = router.handle_request(Request::get("/")).await;
//! ```
//!
//! ## Precedence
//!
//! A literal segment always wins over a `:name` segment, which wins over a
//! `*` catch-all. Parameterized siblings are tried in registration order and
//! the first pattern that matches is taken; there is no backtracking into a
//! sibling once a segment has matched.
//!
//! ## Repeated parameters
//!
//! ```ignore
//! router.handle("/pair/:uuid/:uuid", handler, "GET")?;
//!
//! // in the handler
//! let both = req.params.get_all(":uuid");
//! let second = req.params.get_index(":uuid", 1);
//! ```
//!
//! ## Versions
//!
//! ```ignore
//! router.handle("/#app.v2", index_v2, "GET")?;
//!
//! let req = Request::get("/").header("Accept", "application/vnd.app.v2");
//! ```
//!
//! A request for a version that has no route gets a 404; it never falls
//! back to the unversioned route.

mod config;
mod error;
mod handler;
mod logging;
mod middleware;
mod params;
mod pattern;
mod request;
mod response;
mod router;
mod trie;

pub use config::RouterConfig;
pub use error::{HandlerError, Result, RouterError};
pub use handler::{BoxFuture, BoxHandler, ErrorHandler, Handler};
pub use logging::{trace_request, LogSink, RequestLog};
pub use middleware::{Chain, Constructor};
pub use params::{ParamValue, Params, CATCH_ALL_KEY, ROUTE_NAME_KEY};
pub use pattern::PatternRegistry;
pub use request::{Method, Request};
pub use response::Response;
pub use router::{Dispatch, Outcome, RouteHandle, Router, VERSION_PREFIX};
pub use trie::{Binding, MethodFilter, Node, RouteTable, Walk, CATCH_ALL};
