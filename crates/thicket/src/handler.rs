//! Request handlers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::error::HandlerError;
use crate::request::Request;
use crate::response::Response;

/// A boxed future for async handler operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Anything that can answer a request.
///
/// Implemented for every `Fn(Request) -> impl Future<Output = Response>`,
/// so plain async functions, closures and middleware-wrapped handlers are
/// interchangeable.
///
/// # Example
///
/// ```ignore
/// async fn hello(_req: Request) -> Response {
///     Response::text("hello")
/// }
///
/// router.handle("/hello", hello, "GET")?;
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Handles the request.
    fn call(&self, req: Request) -> BoxFuture<'static, Response>;

    /// Erases the handler type.
    fn boxed(self) -> BoxHandler
    where
        Self: Sized,
    {
        BoxHandler(Arc::new(self))
    }
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        Box::pin(self(req))
    }
}

/// A shared, type-erased handler.
#[derive(Clone)]
pub struct BoxHandler(Arc<dyn Handler>);

impl BoxHandler {
    pub fn new(handler: impl Handler) -> Self {
        handler.boxed()
    }
}

impl Handler for BoxHandler {
    fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        self.0.call(req)
    }

    fn boxed(self) -> BoxHandler {
        self
    }
}

impl std::fmt::Debug for BoxHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BoxHandler")
    }
}

/// Adapts a fallible async function into a [`Handler`].
///
/// `Ok` responses pass through. A [`HandlerError::Status`] becomes a
/// plain-text response with its own status code; any other error becomes a
/// generic 500.
///
/// # Example
///
/// ```ignore
/// async fn load(req: Request) -> Result<Response, HandlerError> {
///     let id = req.params.get(":id").ok_or_else(|| HandlerError::status(400, "no id"))?;
///     Ok(Response::text(id.to_string()))
/// }
///
/// router.handle("/items/:id", ErrorHandler::new(load), "GET")?;
/// ```
pub struct ErrorHandler<F>(F);

impl<F> ErrorHandler<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F, Fut> Handler for ErrorHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        let fut = (self.0)(req);
        Box::pin(async move {
            match fut.await {
                Ok(response) => response,
                Err(err) => {
                    debug!(status = err.code(), error = %err, "handler returned an error");
                    err.into_response()
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok_handler(_req: Request) -> Response {
        Response::text("ok")
    }

    #[tokio::test]
    async fn test_fn_is_handler() {
        let handler = BoxHandler::new(ok_handler);
        let res = handler.call(Request::get("/")).await;
        assert_eq!(res.body_string(), Some("ok".to_string()));
    }

    #[tokio::test]
    async fn test_boxed_handler_is_not_rewrapped() {
        let handler = BoxHandler::new(ok_handler);
        let again = handler.clone().boxed();
        assert!(Arc::ptr_eq(&handler.0, &again.0));
    }

    #[tokio::test]
    async fn test_error_handler() {
        let handler = ErrorHandler::new(|req: Request| async move {
            match req.path.as_str() {
                "/ok" => Ok(Response::text("fine")),
                "/teapot" => Err(HandlerError::status(418, "I'm a teapot")),
                _ => Err(HandlerError::Other("boom".into())),
            }
        });

        assert_eq!(handler.call(Request::get("/ok")).await.status, 200);

        let res = handler.call(Request::get("/teapot")).await;
        assert_eq!(res.status, 418);
        assert_eq!(res.body_string(), Some("I'm a teapot".to_string()));

        assert_eq!(handler.call(Request::get("/other")).await.status, 500);
    }
}
