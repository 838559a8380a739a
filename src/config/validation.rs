//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream is an absolute http URL
//! - Check route prefixes are well-formed
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DevServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::DevServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("proxy.upstream `{0}` is not an absolute http URL")]
    InvalidUpstream(String),

    #[error("proxy route `{0}` must start with '/'")]
    InvalidProxyPath(String),

    #[error("site.docs_prefix `{0}` must start and end with '/'")]
    InvalidDocsPrefix(String),

    #[error("site.index_document `{0}` must be a bare file name")]
    InvalidIndexDocument(String),

    #[error("timeouts.upstream_secs must be greater than zero")]
    ZeroUpstreamTimeout,
}

/// Check every semantic constraint and report all failures together.
pub fn validate_config(config: &DevServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let upstream_ok = Url::parse(&config.proxy.upstream)
        .map(|u| u.scheme() == "http" && u.host_str().is_some())
        .unwrap_or(false);
    if !upstream_ok {
        errors.push(ValidationError::InvalidUpstream(config.proxy.upstream.clone()));
    }

    for path in config.proxy.path_prefixes.iter().chain(&config.proxy.exact_paths) {
        if !path.starts_with('/') {
            errors.push(ValidationError::InvalidProxyPath(path.clone()));
        }
    }

    let prefix = &config.site.docs_prefix;
    if prefix.len() < 2 || !prefix.starts_with('/') || !prefix.ends_with('/') {
        errors.push(ValidationError::InvalidDocsPrefix(prefix.clone()));
    }

    let index = &config.site.index_document;
    if index.is_empty() || index.contains('/') || index == "." || index == ".." {
        errors.push(ValidationError::InvalidIndexDocument(index.clone()));
    }

    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroUpstreamTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
