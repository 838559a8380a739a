//! Ordered request classification.
//!
//! # Responsibilities
//! - Store (matcher, dispatch) pairs in priority order
//! - Classify a request path into exactly one dispatch target
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins; the table always ends with a catch-all
//! - Policy is data: the handler only interprets the returned `Dispatch`

use crate::config::DevServerConfig;
use crate::routing::matcher::{AnyOfMatcher, AnyPath, ExactPathMatcher, Matcher, PathPrefixMatcher};

/// Where a request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Forward to the upstream.
    Proxy,
    /// Resolve under the docs subtree with the docs rule.
    Docs,
    /// Serve the tree's index document or redirect to the docs.
    Root,
    /// Resolve from the top of the tree with the tree rule.
    Tree,
}

/// Priority-ordered routing table.
#[derive(Debug)]
pub struct RouteTable {
    entries: Vec<(Box<dyn Matcher>, Dispatch)>,
}

impl RouteTable {
    /// Build the table: proxy paths, docs prefix, `/`, then everything else.
    pub fn from_config(config: &DevServerConfig) -> Self {
        let mut proxy: Vec<Box<dyn Matcher>> = Vec::new();
        for prefix in &config.proxy.path_prefixes {
            proxy.push(Box::new(PathPrefixMatcher::new(prefix.clone())));
        }
        for path in &config.proxy.exact_paths {
            proxy.push(Box::new(ExactPathMatcher::new(path.clone())));
        }

        let proxy: Box<dyn Matcher> = Box::new(AnyOfMatcher::new(proxy));
        let docs: Box<dyn Matcher> = Box::new(PathPrefixMatcher::new(config.site.docs_prefix.clone()));
        let root: Box<dyn Matcher> = Box::new(ExactPathMatcher::new("/"));

        Self::new(vec![
            (proxy, Dispatch::Proxy),
            (docs, Dispatch::Docs),
            (root, Dispatch::Root),
        ])
    }

    /// Build a table from explicit entries; a catch-all to `Tree` is appended.
    pub fn new(mut entries: Vec<(Box<dyn Matcher>, Dispatch)>) -> Self {
        let catch_all: Box<dyn Matcher> = Box::new(AnyPath);
        entries.push((catch_all, Dispatch::Tree));
        Self { entries }
    }

    /// Classify a request path.
    pub fn classify(&self, path: &str) -> Dispatch {
        self.entries
            .iter()
            .find(|(matcher, _)| matcher.matches(path))
            .map(|(_, dispatch)| *dispatch)
            .unwrap_or(Dispatch::Tree)
    }
}
