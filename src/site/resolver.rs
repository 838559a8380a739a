//! try_files resolution against the served tree.
//!
//! # Responsibilities
//! - Expand each template of a rule against the request path
//! - Return the first candidate that is an existing regular file
//! - Fall back to the route's index document
//! - Detect `.../<index>/` requests that must be redirected instead

use std::path::PathBuf;

use crate::site::rule::{PathTemplate, RouteRule};

/// A static route: URL prefix, the directory it maps to, and its index file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRoute {
    /// URL prefix, starting and ending with `/`.
    pub base: String,
    /// Directory the prefix maps to.
    pub root: PathBuf,
    /// Per-directory index document, also the route's fallback.
    pub index_document: String,
}

impl StaticRoute {
    pub fn new(base: impl Into<String>, root: impl Into<PathBuf>, index_document: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            root: root.into(),
            index_document: index_document.into(),
        }
    }

    /// The index document at the route's base.
    pub fn fallback(&self) -> PathBuf {
        self.root.join(&self.index_document)
    }

    /// Request path with the route base removed, e.g. `/docs/a/b` → `a/b`.
    pub fn relative<'p>(&self, path: &'p str) -> &'p str {
        path.strip_prefix(self.base.as_str())
            .or_else(|| path.strip_prefix('/'))
            .unwrap_or(path)
    }
}

/// Outcome of resolution: a concrete path and whether it is a regular file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub path: PathBuf,
    pub is_file: bool,
}

/// Resolve `request_path` (relative to `route.base`) against `rule`.
///
/// Template order is authoritative. Directories never satisfy a template.
/// When nothing matches the route's index document is returned, with
/// `is_file` telling the caller whether it exists.
pub async fn resolve(request_path: &str, rule: &RouteRule, route: &StaticRoute) -> ResolvedTarget {
    for template in rule.templates() {
        let Some(candidate) = candidate_path(template, request_path, route) else {
            tracing::debug!(template = %template, path = %request_path, "Rejected unsafe candidate");
            continue;
        };

        tracing::debug!(candidate = %candidate.display(), "Trying path");
        if is_regular_file(&candidate).await {
            return ResolvedTarget {
                path: candidate,
                is_file: true,
            };
        }
    }

    let fallback = route.fallback();
    let is_file = is_regular_file(&fallback).await;
    tracing::debug!(fallback = %fallback.display(), exists = is_file, "No template matched");
    ResolvedTarget {
        path: fallback,
        is_file,
    }
}

/// Map one template to a filesystem path under `route.root`.
///
/// Returns `None` for expansions that would escape the root.
pub fn candidate_path(template: &PathTemplate, request_path: &str, route: &StaticRoute) -> Option<PathBuf> {
    let expanded = template.expand(request_path);
    let relative = if template.is_literal() {
        expanded
            .strip_prefix(route.base.as_str())
            .or_else(|| expanded.strip_prefix('/'))
            .unwrap_or(expanded.as_str())
    } else {
        expanded.as_str()
    };

    let mut path = route.root.clone();
    for segment in relative.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\0') || s.contains('\\') => return None,
            s => path.push(s),
        }
    }

    if template.is_directory() {
        path.push(&route.index_document);
    }
    Some(path)
}

async fn is_regular_file(path: &std::path::Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Redirect location for a relative path ending in `<index>/`, if any.
///
/// `guide/index.html/` under `/docs/` → `/docs/guide`; a bare `index.html/`
/// → the base itself.
pub fn index_redirect(relative: &str, route: &StaticRoute) -> Option<String> {
    let suffix = format!("{}/", route.index_document);
    let dir = relative.strip_suffix(suffix.as_str())?;
    if !dir.is_empty() && !dir.ends_with('/') {
        return None;
    }

    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        Some(route.base.clone())
    } else {
        Some(format!("{}{}", route.base, dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn docs_tree() -> (TempDir, StaticRoute) {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(docs.join("guide")).unwrap();
        fs::create_dir_all(docs.join("api")).unwrap();
        fs::write(docs.join("index.html"), "docs index").unwrap();
        fs::write(docs.join("guide.html"), "guide page").unwrap();
        fs::write(docs.join("guide").join("index.html"), "guide index").unwrap();
        fs::write(docs.join("api").join("index.html"), "api index").unwrap();
        fs::write(docs.join("intro"), "bare intro").unwrap();
        fs::write(docs.join("intro.html"), "intro page").unwrap();
        let route = StaticRoute::new("/docs/", docs, "index.html");
        (dir, route)
    }

    #[tokio::test]
    async fn earlier_template_wins() {
        let (_dir, route) = docs_tree();
        let rule = RouteRule::default_for("index.html");

        let target = resolve("intro", &rule, &route).await;
        assert!(target.is_file);
        assert_eq!(target.path, route.root.join("intro"));

        let reversed = RouteRule::new(["$uri.html", "$uri"]);
        let target = resolve("intro", &reversed, &route).await;
        assert_eq!(target.path, route.root.join("intro.html"));
    }

    #[tokio::test]
    async fn directory_is_skipped() {
        let (_dir, route) = docs_tree();
        let rule = RouteRule::default_for("index.html");

        // `guide` is a directory; `$uri.html` comes next and exists.
        let target = resolve("guide", &rule, &route).await;
        assert_eq!(target.path, route.root.join("guide.html"));

        // `api` is a directory with no `api.html`; `$uri/index.html` matches.
        let target = resolve("api", &rule, &route).await;
        assert_eq!(target.path, route.root.join("api").join("index.html"));
    }

    #[tokio::test]
    async fn directory_template_uses_index_document() {
        let (_dir, route) = docs_tree();
        let rule = RouteRule::new(["$uri", "$uri/"]);
        let target = resolve("api", &rule, &route).await;
        assert_eq!(target.path, route.root.join("api").join("index.html"));
    }

    #[tokio::test]
    async fn literal_template_relative_to_route() {
        let (_dir, route) = docs_tree();
        let rule = RouteRule::new(["$uri", "/docs/index.html"]);
        let target = resolve("missing/page", &rule, &route).await;
        assert!(target.is_file);
        assert_eq!(target.path, route.root.join("index.html"));
    }

    #[tokio::test]
    async fn falls_back_to_index_then_reports_missing() {
        let (dir, route) = docs_tree();
        let rule = RouteRule::new(["$uri"]);

        let target = resolve("nope", &rule, &route).await;
        assert!(target.is_file);
        assert_eq!(target.path, route.fallback());

        let empty = StaticRoute::new("/docs/", dir.path().join("empty"), "index.html");
        let target = resolve("nope", &rule, &empty).await;
        assert!(!target.is_file);
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (dir, route) = docs_tree();
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();
        let rule = RouteRule::new(["$uri"]);

        let target = resolve("../secret.txt", &rule, &route).await;
        assert_eq!(target.path, route.fallback());
    }

    #[test]
    fn relative_strips_base() {
        let route = StaticRoute::new("/docs/", "/srv/docs", "index.html");
        assert_eq!(route.relative("/docs/a/b"), "a/b");
        assert_eq!(route.relative("/docs/"), "");

        let tree = StaticRoute::new("/", "/srv", "index.html");
        assert_eq!(tree.relative("/assets/app.js"), "assets/app.js");
    }

    #[test]
    fn index_redirects() {
        let route = StaticRoute::new("/docs/", "/srv/docs", "index.html");
        assert_eq!(index_redirect("guide/index.html/", &route).as_deref(), Some("/docs/guide"));
        assert_eq!(index_redirect("a/b/index.html/", &route).as_deref(), Some("/docs/a/b"));
        assert_eq!(index_redirect("index.html/", &route).as_deref(), Some("/docs/"));
        assert_eq!(index_redirect("guide/index.html", &route), None);
        assert_eq!(index_redirect("myindex.html/", &route), None);
        assert_eq!(index_redirect("guide/", &route), None);
    }
}
