//! Main router implementation.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tracing::{error, trace};

use crate::config::RouterConfig;
use crate::error::{HandlerError, Result, RouterError};
use crate::handler::{BoxFuture, BoxHandler, ErrorHandler, Handler};
use crate::logging::{trace_request, LogSink, RequestLog};
use crate::params::{Params, CATCH_ALL_KEY, ROUTE_NAME_KEY};
use crate::pattern::PatternRegistry;
use crate::request::{Method, Request};
use crate::response::Response;
use crate::trie::{Node, RouteTable, Walk};

/// Media type prefix announcing an API version: `application/vnd.<app>.<version>`.
pub const VERSION_PREFIX: &str = "application/vnd.";

/// A registered route, returned so it can be given a name.
pub struct RouteHandle<'a> {
    node: &'a mut Node,
}

impl RouteHandle<'_> {
    /// Names the route. Handlers see the name through [`Params::route_name`].
    pub fn name(self, name: impl Into<String>) -> Self {
        self.node.set_name(name);
        self
    }

    /// The table node the route ended on.
    pub fn node(&self) -> &Node {
        self.node
    }
}

/// How a dispatch was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found,
    NotFound,
    MethodNotAllowed,
}

/// A resolved request: the handler to run and what was captured on the way.
#[derive(Debug)]
pub struct Dispatch<'a> {
    pub handler: &'a BoxHandler,
    pub params: Params,
    pub outcome: Outcome,
}

/// The main router for handling HTTP requests.
///
/// Routes are registered through `&mut self` and served through `&self`, so
/// once the router is shared (for example behind an `Arc`) the table can no
/// longer change.
pub struct Router {
    /// Registered routes.
    routes: RouteTable,
    /// Named patterns for `:name` segments.
    patterns: PatternRegistry,
    not_found: BoxHandler,
    not_allowed: BoxHandler,
    panic_handler: Option<BoxHandler>,
    log_sink: LogSink,
    config: RouterConfig,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("patterns", &self.patterns)
            .field("has_panic_handler", &self.panic_handler.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl Router {
    /// Creates a new empty router.
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            patterns: PatternRegistry::new(),
            not_found: BoxHandler::new(|_req: Request| async { Response::not_found() }),
            not_allowed: BoxHandler::new(|_req: Request| async { Response::method_not_allowed() }),
            panic_handler: None,
            log_sink: Arc::new(trace_request),
            config: RouterConfig::default(),
        }
    }

    /// Replaces the router configuration.
    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the handler used when no route matches.
    #[must_use]
    pub fn not_found(mut self, handler: impl Handler) -> Self {
        self.not_found = handler.boxed();
        self
    }

    /// Sets the handler used when a route matches but the method does not.
    #[must_use]
    pub fn method_not_allowed(mut self, handler: impl Handler) -> Self {
        self.not_allowed = handler.boxed();
        self
    }

    /// Sets the handler that answers in place of a handler that panicked.
    ///
    /// It receives the request as it was before the failing handler ran.
    #[must_use]
    pub fn panic_handler(mut self, handler: impl Handler) -> Self {
        self.panic_handler = Some(handler.boxed());
        self
    }

    /// Replaces the request log sink. Only used when `log_requests` is set.
    #[must_use]
    pub fn log_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&RequestLog, &Request) + Send + Sync + 'static,
    {
        self.log_sink = Arc::new(sink);
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The route table, for introspection.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Adds a named pattern usable as a `:name` path segment.
    ///
    /// ```
    /// use thicket::Router;
    ///
    /// let mut router = Router::new();
    /// router.add_regex(":id", r"\d+").unwrap();
    /// assert!(router.add_regex("id", r"\d+").is_err());
    /// ```
    pub fn add_regex(&mut self, name: &str, pattern: &str) -> Result<()> {
        self.patterns.set(name, pattern)
    }

    /// Registers `handler` for `path`.
    ///
    /// `path` is a `/` separated list of segments: literal text, a `:name`
    /// added with [`Router::add_regex`], or a final `*` catch-all. A
    /// `#version` suffix scopes the route to requests announcing that
    /// version. `methods` is a comma-separated list of verbs; blank means
    /// `ALL`.
    ///
    /// ```ignore
    /// router.handle("/users/:uuid", get_user, "GET,HEAD")?;
    /// router.handle("/users/:uuid#app.v2", get_user_v2, "GET")?;
    /// router.handle("/static/*", serve_static, "")?.name("static");
    /// ```
    pub fn handle(
        &mut self,
        path: &str,
        handler: impl Handler,
        methods: &str,
    ) -> Result<RouteHandle<'_>> {
        let (path, version) = path.split_once('#').unwrap_or((path, ""));
        let segments = if path.is_empty() {
            Vec::new()
        } else {
            split_path(path)
        };

        if let Some(missing) = segments
            .iter()
            .find(|s| s.starts_with(':') && !self.patterns.contains(s))
        {
            return Err(RouterError::UnknownPattern((*missing).to_string()));
        }

        let node = self
            .routes
            .set(&segments, handler.boxed(), methods, version)?;
        Ok(RouteHandle { node })
    }

    /// Registers a fallible handler; see [`ErrorHandler`].
    pub fn handle_fn<F, Fut>(&mut self, path: &str, f: F, methods: &str) -> Result<RouteHandle<'_>>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Response, HandlerError>> + Send + 'static,
    {
        self.handle(path, ErrorHandler::new(f), methods)
    }

    /// Registers a GET route.
    pub fn get(&mut self, path: &str, handler: impl Handler) -> Result<RouteHandle<'_>> {
        self.handle(path, handler, "GET")
    }

    /// Registers a POST route.
    pub fn post(&mut self, path: &str, handler: impl Handler) -> Result<RouteHandle<'_>> {
        self.handle(path, handler, "POST")
    }

    /// Registers a PUT route.
    pub fn put(&mut self, path: &str, handler: impl Handler) -> Result<RouteHandle<'_>> {
        self.handle(path, handler, "PUT")
    }

    /// Registers a PATCH route.
    pub fn patch(&mut self, path: &str, handler: impl Handler) -> Result<RouteHandle<'_>> {
        self.handle(path, handler, "PATCH")
    }

    /// Registers a DELETE route.
    pub fn delete(&mut self, path: &str, handler: impl Handler) -> Result<RouteHandle<'_>> {
        self.handle(path, handler, "DELETE")
    }

    /// Resolves a request to its handler without running it.
    ///
    /// Misses resolve to the configured not-found or not-allowed handler.
    pub fn dispatch<'a>(
        &'a self,
        path: &str,
        method: Method,
        version_header: Option<&str>,
    ) -> Dispatch<'a> {
        let version = version_from(version_header);
        match self.find_route(path, method, version) {
            Ok((handler, params)) => Dispatch {
                handler,
                params,
                outcome: Outcome::Found,
            },
            Err(err) => {
                trace!(error = %err, version, "dispatch miss");
                let (handler, outcome) = match err {
                    RouterError::MethodNotAllowed { .. } => {
                        (&self.not_allowed, Outcome::MethodNotAllowed)
                    }
                    _ => (&self.not_found, Outcome::NotFound),
                };
                Dispatch {
                    handler,
                    params: Params::new(),
                    outcome,
                }
            }
        }
    }

    /// Handles an incoming request.
    ///
    /// Always yields a response: misses go to the fallback handlers and a
    /// panicking handler is answered by the panic handler or a plain 500.
    pub fn handle_request<'a>(&'a self, mut request: Request) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let started = Instant::now();
            let request_id = self
                .config
                .request_id_header
                .as_deref()
                .and_then(|h| request.get_header(h))
                .map(str::to_string);

            let dispatch = self.dispatch(
                &request.path,
                request.method,
                request.get_header(&self.config.version_header),
            );
            request.params = dispatch.params;

            let logged = self.config.log_requests.then(|| request.clone());
            let mut response = self.invoke(dispatch.handler, request).await;

            if let (Some(header), Some(id)) = (&self.config.request_id_header, &request_id) {
                response = response.header(header.clone(), id.clone());
            }
            if let Some(req) = logged {
                let log = RequestLog::new(&req, &response, started.elapsed(), request_id);
                (self.log_sink)(&log, &req);
            }
            response
        })
    }

    /// Runs a handler, converting a panic into a response.
    async fn invoke(&self, handler: &BoxHandler, request: Request) -> Response {
        let method = request.method;
        let path = request.path.clone();
        let fallback = self
            .panic_handler
            .as_ref()
            .map(|h| (h.clone(), request.clone()));

        let payload = match guarded(handler.clone(), request).await {
            Ok(response) => return response,
            Err(payload) => payload,
        };
        error!(
            %method,
            %path,
            panic = %panic_message(payload.as_ref()),
            "handler panicked"
        );

        match fallback {
            Some((panic_handler, original)) => match guarded(panic_handler, original).await {
                Ok(response) => response,
                Err(payload) => {
                    error!(panic = %panic_message(payload.as_ref()), "panic handler panicked");
                    Response::internal_server_error()
                }
            },
            None => Response::internal_server_error(),
        }
    }

    /// Finds the handler for a request, collecting captured values.
    fn find_route(
        &self,
        path: &str,
        method: Method,
        version: &str,
    ) -> Result<(&BoxHandler, Params)> {
        let segments = split_path(path);
        let mut params = Params::new();
        let mut walk = self.routes.get(&segments, version);

        let node = loop {
            match walk {
                Walk::Leaf(node) if !node.bindings().is_empty() => break node,
                Walk::Leaf(_) => return Err(not_found(path, method)),
                Walk::Pending { node, at } => {
                    let key = segments[at];
                    let matched = node
                        .param_children(version)
                        .find(|child| self.patterns.is_match(child.segment(), key));

                    if let Some(child) = matched {
                        params.add(child.segment(), key);
                        walk = if at + 1 == segments.len() {
                            Walk::Leaf(child)
                        } else {
                            child.walk(&segments, at + 1, version)
                        };
                        continue;
                    }

                    match node.catchall_child(version) {
                        Some(catchall) => {
                            let rest = match remainder(path, at) {
                                "" => segments[at..].join("/"),
                                rest => rest.to_string(),
                            };
                            params.add(CATCH_ALL_KEY, rest);
                            break catchall;
                        }
                        None => return Err(not_found(path, method)),
                    }
                }
            }
        };

        let handler = node
            .resolve_method(method)
            .ok_or_else(|| RouterError::MethodNotAllowed {
                method: method.to_string(),
                path: path.to_string(),
            })?;

        if let Some(name) = node.name() {
            params.add(ROUTE_NAME_KEY, name);
        }
        Ok((handler, params))
    }
}

fn not_found(path: &str, method: Method) -> RouterError {
    RouterError::NotFound {
        method: method.to_string(),
        path: path.to_string(),
    }
}

/// Splits a path into segments; an empty or all-slash path is `["/"]`.
fn split_path(path: &str) -> Vec<&str> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        vec!["/"]
    } else {
        segments
    }
}

/// The raw path after its first `skip` segments, leading slashes removed.
///
/// Empty segments inside the remainder are kept as sent.
fn remainder(path: &str, skip: usize) -> &str {
    let mut rest = path.trim_start_matches('/');
    for _ in 0..skip {
        rest = rest
            .split_once('/')
            .map_or("", |(_, tail)| tail)
            .trim_start_matches('/');
    }
    rest
}

/// Extracts the version from a header such as `application/vnd.app.v2`.
fn version_from(header: Option<&str>) -> &str {
    header
        .and_then(|h| h.rfind(VERSION_PREFIX).map(|i| &h[i + VERSION_PREFIX.len()..]))
        .map(str::trim)
        .unwrap_or("")
}

async fn guarded(
    handler: BoxHandler,
    request: Request,
) -> std::result::Result<Response, Box<dyn Any + Send>> {
    AssertUnwindSafe(async move { handler.call(request).await })
        .catch_unwind()
        .await
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

    async fn hello_handler(_req: Request) -> Response {
        Response::text("Hello, World!")
    }

    #[test]
    fn test_remainder() {
        assert_eq!(remainder("/toor/a//b/", 1), "a//b/");
        assert_eq!(remainder("//toor//a/b", 1), "a/b");
        assert_eq!(remainder("/a/b/c", 0), "a/b/c");
        assert_eq!(remainder("/a", 1), "");
        assert_eq!(remainder("/", 0), "");
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path(""), vec!["/"]);
        assert_eq!(split_path("///"), vec!["/"]);
        assert_eq!(split_path("/a//b/"), vec!["a", "b"]);
        assert_eq!(split_path("catch_me"), vec!["catch_me"]);
        assert_eq!(split_path("/test/*"), vec!["test", "*"]);
    }

    #[test]
    fn test_version_from() {
        assert_eq!(version_from(None), "");
        assert_eq!(version_from(Some("text/html")), "");
        assert_eq!(version_from(Some("application/vnd.app.v2")), "app.v2");
        assert_eq!(
            version_from(Some("application/vnd.old.v1, application/vnd.app.v3")),
            "app.v3"
        );
    }

    #[test]
    fn test_handle_errors() {
        let mut router = Router::new();
        assert!(matches!(
            router.handle("/:none", hello_handler, ""),
            Err(RouterError::UnknownPattern(name)) if name == ":none"
        ));
        assert!(matches!(
            router.handle("/*/test", hello_handler, ""),
            Err(RouterError::CatchAllNotLast)
        ));
        assert!(matches!(
            router.handle("", hello_handler, ""),
            Err(RouterError::EmptyPath)
        ));
        assert!(matches!(
            router.handle("#v2", hello_handler, ""),
            Err(RouterError::EmptyPath)
        ));
        assert!(router.handle("*", hello_handler, "").is_ok());
        assert!(router.handle("/test/*", hello_handler, "").is_ok());
        assert!(router.handle("/verbose", hello_handler, "").is_ok());
    }

    #[test]
    fn test_unknown_pattern_leaves_table_untouched() {
        let mut router = Router::new();
        assert!(router.handle("/a/:nope", hello_handler, "GET").is_err());
        assert!(router.routes().root().children().is_empty());
    }

    #[test]
    fn test_dispatch_outcomes() {
        let mut router = Router::new();
        router.add_regex(":uuid", UUID).unwrap();
        router.get("/", hello_handler).unwrap();
        router
            .handle("/users/:uuid", hello_handler, "GET, HEAD")
            .unwrap()
            .name("user");

        assert_eq!(router.dispatch("/", Method::Get, None).outcome, Outcome::Found);
        assert_eq!(
            router.dispatch("/", Method::Post, None).outcome,
            Outcome::MethodNotAllowed
        );
        assert_eq!(
            router.dispatch("/nope", Method::Get, None).outcome,
            Outcome::NotFound
        );

        let found = router.dispatch(
            "/users/3B96853C-EF0B-44BC-8820-A982A5756E25",
            Method::Head,
            None,
        );
        assert_eq!(found.outcome, Outcome::Found);
        assert_eq!(
            found.params.get(":uuid"),
            Some("3B96853C-EF0B-44BC-8820-A982A5756E25")
        );
        assert_eq!(found.params.route_name(), Some("user"));

        let miss = router.dispatch("/users/not-a-uuid", Method::Get, None);
        assert_eq!(miss.outcome, Outcome::NotFound);
        assert!(miss.params.is_empty());
    }

    #[test]
    fn test_route_handle_node() {
        let mut router = Router::new();
        let handle = router.handle("/foo/bar/zzz", hello_handler, "GET").unwrap();
        let handle = handle.name("3z");
        assert_eq!(handle.node().name(), Some("3z"));
        assert_eq!(handle.node().segment(), "zzz");
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[tokio::test]
    async fn test_basic_routing() {
        let mut router = Router::new();
        router.get("/", hello_handler).unwrap();

        let res = router.handle_request(Request::get("/")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("Hello, World!".to_string()));

        assert_eq!(router.handle_request(Request::get("/nonexistent")).await.status, 404);
        assert_eq!(router.handle_request(Request::post("/")).await.status, 405);
    }
}
