//! Lazily extracted, process-lifetime rule cache.

use std::path::PathBuf;
use tokio::sync::OnceCell;

use crate::nginx::extract::extract;
use crate::site::rule::RouteRule;

/// Memoizes the rule for one location prefix.
///
/// The document is read on first use and never again; any failure falls back
/// to [`RouteRule::default_for`] and is logged once.
#[derive(Debug)]
pub struct RuleCache {
    document: PathBuf,
    prefix: String,
    index_document: String,
    rule: OnceCell<RouteRule>,
}

impl RuleCache {
    pub fn new(document: impl Into<PathBuf>, prefix: impl Into<String>, index_document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            prefix: prefix.into(),
            index_document: index_document.into(),
            rule: OnceCell::new(),
        }
    }

    /// The cached rule, extracting it on first call.
    pub async fn get(&self) -> &RouteRule {
        self.rule.get_or_init(|| self.load()).await
    }

    async fn load(&self) -> RouteRule {
        let content = match tokio::fs::read_to_string(&self.document).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    document = %self.document.display(),
                    prefix = %self.prefix,
                    error = %e,
                    "Routing document unreadable, using default try_files"
                );
                return RouteRule::default_for(&self.index_document);
            }
        };

        match extract(&content, &self.prefix) {
            Ok(rule) => {
                tracing::info!(
                    prefix = %self.prefix,
                    templates = ?rule.templates().iter().map(|t| t.as_str()).collect::<Vec<_>>(),
                    "Extracted try_files rule"
                );
                rule
            }
            Err(e) => {
                tracing::warn!(
                    document = %self.document.display(),
                    prefix = %self.prefix,
                    error = %e,
                    "Using default try_files"
                );
                RouteRule::default_for(&self.index_document)
            }
        }
    }
}
