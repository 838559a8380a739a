//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix (case-sensitive)
//! - Match exact path (case-sensitive)
//! - Combine conditions with OR semantics
//!
//! # Design Decisions
//! - Matchers see only the path; the query string never affects routing
//! - No regex to guarantee O(n) matching

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Matches one path exactly.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, path: &str) -> bool {
        path == self.path
    }
}

/// Matches every path.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyPath;

impl Matcher for AnyPath {
    fn matches(&self, _path: &str) -> bool {
        true
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug)]
pub struct AnyOfMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyOfMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyOfMatcher {
    fn matches(&self, path: &str) -> bool {
        // Any matcher may pass (OR); an empty set matches nothing
        self.matchers.iter().any(|m| m.matches(path))
    }
}
