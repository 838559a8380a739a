//! Static tree subsystem.
//!
//! # Data Flow
//! ```text
//! docs request (/docs/...)
//!     → index_redirect? → 301
//!     → RuleCache (docs rule, extracted lazily)
//!     → resolver.rs (first existing regular file)
//!     → responder.rs (200 / 404 / 500)
//!
//! root request (/)
//!     → <root>/index.html if present, else 302 to the docs prefix
//!
//! any other request
//!     → RuleCache (tree rule) → resolver.rs → responder.rs
//! ```

pub mod resolver;
pub mod responder;
pub mod rule;

use axum::{http::StatusCode, response::Response};

use crate::config::SiteConfig;
use crate::http::response::{not_found, redirect};
use crate::nginx::RuleCache;

pub use resolver::{resolve, ResolvedTarget, StaticRoute};
pub use rule::{PathTemplate, RouteRule};

/// The served build tree: its docs subtree and its top level, each with a lazily
/// extracted rule.
#[derive(Debug)]
pub struct Site {
    docs: StaticRoute,
    tree: StaticRoute,
    docs_rule: RuleCache,
    tree_rule: RuleCache,
}

impl Site {
    pub fn new(config: &SiteConfig) -> Self {
        let docs = StaticRoute::new(
            config.docs_prefix.clone(),
            config.docs_dir(),
            config.index_document.clone(),
        );
        let tree = StaticRoute::new("/", config.root.clone(), config.index_document.clone());

        Self {
            docs_rule: RuleCache::new(&config.nginx_conf, docs.base.clone(), config.index_document.clone()),
            tree_rule: RuleCache::new(&config.nginx_conf, "/", config.index_document.clone()),
            docs,
            tree,
        }
    }

    /// Serve a path under the docs prefix.
    pub async fn serve_docs(&self, path: &str) -> Response {
        let relative = self.docs.relative(path);

        if let Some(location) = resolver::index_redirect(relative, &self.docs) {
            tracing::debug!(path = %path, location = %location, "Normalizing trailing index");
            return redirect(StatusCode::MOVED_PERMANENTLY, &location);
        }

        let rule = self.docs_rule.get().await;
        serve_target(resolve(relative, rule, &self.docs).await).await
    }

    /// Serve `/`: the tree's index document, or a temporary redirect to the docs.
    pub async fn serve_root(&self) -> Response {
        let index = self.tree.fallback();
        let exists = tokio::fs::metadata(&index)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);

        if exists {
            responder::serve(&index).await
        } else {
            tracing::debug!(location = %self.docs.base, "No root index, redirecting to docs");
            redirect(StatusCode::FOUND, &self.docs.base)
        }
    }

    /// Serve any other path from the top of the tree.
    pub async fn serve_tree(&self, path: &str) -> Response {
        let relative = self.tree.relative(path);
        let rule = self.tree_rule.get().await;
        serve_target(resolve(relative, rule, &self.tree).await).await
    }
}

async fn serve_target(target: ResolvedTarget) -> Response {
    if target.is_file {
        responder::serve(&target.path).await
    } else {
        not_found()
    }
}
