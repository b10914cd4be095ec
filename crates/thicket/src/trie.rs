//! The route table: a prefix tree keyed by path segment and version.
//!
//! Each node is one path segment under one version scope. Lookups only
//! follow exact `(segment, version)` children; parameterized and catch-all
//! alternatives are left to the router, which picks up from the
//! [`Walk::Pending`] hand-off point.

use tracing::debug;

use crate::error::{Result, RouterError};
use crate::handler::BoxHandler;
use crate::request::Method;

/// Segment marking a catch-all route.
pub const CATCH_ALL: &str = "*";

/// Which request methods a binding answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodFilter {
    /// Registered as `ALL` (or with no method list).
    All,
    /// A single HTTP verb.
    Only(Method),
}

impl MethodFilter {
    /// Parses a comma-separated, case-insensitive method list.
    ///
    /// Items are trimmed and empty items skipped; a blank list means `ALL`.
    pub fn parse_list(list: &str) -> Result<Vec<Self>> {
        let mut filters = Vec::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let upper = item.to_uppercase();
            if upper == "ALL" {
                filters.push(Self::All);
            } else {
                let method =
                    Method::from_str(&upper).ok_or_else(|| RouterError::InvalidMethod(item.to_string()))?;
                filters.push(Self::Only(method));
            }
        }
        if filters.is_empty() {
            filters.push(Self::All);
        }
        Ok(filters)
    }
}

impl std::fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Only(method) => write!(f, "{method}"),
        }
    }
}

/// A method bound to a handler on a node.
#[derive(Debug, Clone)]
pub struct Binding {
    pub method: MethodFilter,
    pub handler: BoxHandler,
}

/// One segment of the route table.
#[derive(Debug, Default)]
pub struct Node {
    segment: String,
    version: String,
    children: Vec<Node>,
    bindings: Vec<Binding>,
    has_param_child: bool,
    has_catchall_child: bool,
    name: Option<String>,
}

/// Outcome of walking the literal segments of a path.
#[derive(Debug, Clone, Copy)]
pub enum Walk<'a> {
    /// Every segment matched a literal child; this is the last one.
    Leaf(&'a Node),
    /// `segments[at]` has no literal child under `node`.
    Pending { node: &'a Node, at: usize },
}

impl Node {
    fn new(segment: &str, version: &str) -> Self {
        Self {
            segment: segment.to_string(),
            version: version.to_string(),
            ..Self::default()
        }
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Method bindings in registration order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn has_param_child(&self) -> bool {
        self.has_param_child
    }

    pub fn has_catchall_child(&self) -> bool {
        self.has_catchall_child
    }

    /// The route name, if one was assigned.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Whether this node is a `:name` segment.
    pub fn is_param(&self) -> bool {
        self.segment.starts_with(':')
    }

    fn child(&self, segment: &str, version: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|n| n.segment == segment && n.version == version)
    }

    /// Parameterized children of the given version, in insertion order.
    pub fn param_children<'a, 'v>(&'a self, version: &'v str) -> impl Iterator<Item = &'a Node> + 'v
    where
        'a: 'v,
    {
        let children: &[Node] = if self.has_param_child {
            &self.children
        } else {
            &[]
        };
        children
            .iter()
            .filter(move |n| n.is_param() && n.version == version)
    }

    /// The catch-all child of the given version.
    pub fn catchall_child(&self, version: &str) -> Option<&Node> {
        if self.has_catchall_child {
            self.child(CATCH_ALL, version)
        } else {
            None
        }
    }

    /// Follows literal children for `segments[at..]`.
    pub fn walk<'a>(&'a self, segments: &[&str], mut at: usize, version: &str) -> Walk<'a> {
        let mut node = self;
        while let Some(segment) = segments.get(at) {
            match node.child(segment, version) {
                Some(child) if at + 1 == segments.len() => return Walk::Leaf(child),
                Some(child) => {
                    node = child;
                    at += 1;
                }
                None => return Walk::Pending { node, at },
            }
        }
        Walk::Leaf(node)
    }

    /// Picks the handler for `method`.
    ///
    /// The first `ALL` binding wins over any exact binding, even one
    /// registered earlier; otherwise the first exact binding is used.
    pub fn resolve_method(&self, method: Method) -> Option<&BoxHandler> {
        self.bindings
            .iter()
            .find(|b| b.method == MethodFilter::All)
            .or_else(|| {
                self.bindings
                    .iter()
                    .find(|b| b.method == MethodFilter::Only(method))
            })
            .map(|b| &b.handler)
    }
}

/// The prefix tree holding every registered route.
#[derive(Debug, Default)]
pub struct RouteTable {
    root: Node,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The synthetic node above the first path segment.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Inserts a route and returns its leaf node.
    ///
    /// Nothing is inserted when the route is rejected.
    pub fn set(
        &mut self,
        segments: &[&str],
        handler: BoxHandler,
        methods: &str,
        version: &str,
    ) -> Result<&mut Node> {
        let Some((_, parents)) = segments.split_last() else {
            return Err(RouterError::EmptyPath);
        };
        if parents.contains(&CATCH_ALL) {
            return Err(RouterError::CatchAllNotLast);
        }
        let filters = MethodFilter::parse_list(methods)?;

        let mut node = &mut self.root;
        for segment in segments {
            let idx = match node
                .children
                .iter()
                .position(|n| n.segment == *segment && n.version == version)
            {
                Some(idx) => idx,
                None => {
                    if segment.starts_with(':') {
                        node.has_param_child = true;
                    }
                    if *segment == CATCH_ALL {
                        node.has_catchall_child = true;
                    }
                    node.children.push(Node::new(segment, version));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[idx];
        }

        debug!(
            segments = ?segments,
            version,
            methods = %filters.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
            "route registered"
        );

        node.bindings.extend(filters.into_iter().map(|method| Binding {
            method,
            handler: handler.clone(),
        }));
        Ok(node)
    }

    /// Walks the literal segments of a path from the root.
    pub fn get(&self, segments: &[&str], version: &str) -> Walk<'_> {
        self.root.walk(segments, 0, version)
    }
}
