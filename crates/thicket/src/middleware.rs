//! Middleware chaining.

use std::future::Future;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::handler::{BoxHandler, ErrorHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// Wraps a handler into a new handler.
pub type Constructor = Arc<dyn Fn(BoxHandler) -> BoxHandler + Send + Sync>;

/// An ordered list of middleware constructors.
///
/// `Chain::new([m1, m2, m3]).then(h)` is equivalent to `m1(m2(m3(h)))`, so
/// requests pass through `m1` first.
///
/// # Example
///
/// ```ignore
/// fn common_headers(next: BoxHandler) -> BoxHandler {
///     BoxHandler::new(move |req: Request| {
///         let next = next.clone();
///         async move { next.call(req).await.header("X-App-Version", "1.0") }
///     })
/// }
///
/// let chain = Chain::new().push(common_headers);
/// router.handle("/", chain.then(index), "GET,HEAD")?;
/// ```
#[derive(Clone, Default)]
pub struct Chain {
    constructors: Vec<Constructor>,
}

impl Chain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constructor as the innermost middleware so far.
    #[must_use]
    pub fn push<F>(mut self, constructor: F) -> Self
    where
        F: Fn(BoxHandler) -> BoxHandler + Send + Sync + 'static,
    {
        self.constructors.push(Arc::new(constructor));
        self
    }

    /// Returns a new chain with `constructors` appended after this chain's.
    ///
    /// The original chain is left untouched.
    #[must_use]
    pub fn append(&self, constructors: impl IntoIterator<Item = Constructor>) -> Self {
        let mut chain = self.clone();
        chain.constructors.extend(constructors);
        chain
    }

    /// Returns a new chain running `other` after this one.
    #[must_use]
    pub fn extend(&self, other: &Chain) -> Self {
        self.append(other.constructors.iter().cloned())
    }

    /// Wraps `handler` with every middleware in the chain.
    pub fn then(&self, handler: impl Handler) -> BoxHandler {
        self.constructors
            .iter()
            .rev()
            .fold(handler.boxed(), |next, constructor| constructor(next))
    }

    /// Wraps a fallible handler; see [`ErrorHandler`].
    pub fn then_fn<F, Fut>(&self, f: F) -> BoxHandler
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        self.then(ErrorHandler::new(f))
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("len", &self.constructors.len())
            .finish()
    }
}
