//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dev server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the dev server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DevServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Served tree layout and the routing document to emulate.
    pub site: SiteConfig,

    /// Upstream forwarding settings.
    pub proxy: ProxyConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Static tree configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Build output directory served as the tree root.
    pub root: PathBuf,

    /// URL prefix of the docs subtree. Must start and end with `/`.
    pub docs_prefix: String,

    /// File name of the per-directory index document.
    pub index_document: String,

    /// nginx-style configuration the docs rule is extracted from.
    pub nginx_conf: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("dist"),
            docs_prefix: "/docs/".to_string(),
            index_document: "index.html".to_string(),
            nginx_conf: PathBuf::from("nginx.conf"),
        }
    }
}

impl SiteConfig {
    /// Directory backing the docs prefix (`<root>/docs` for `/docs/`).
    pub fn docs_dir(&self) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in self.docs_prefix.split('/').filter(|s| !s.is_empty()) {
            dir.push(segment);
        }
        dir
    }
}

/// Reverse proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Upstream base URL; the inbound path and query are appended verbatim.
    pub upstream: String,

    /// Path prefixes forwarded to the upstream.
    pub path_prefixes: Vec<String>,

    /// Exact paths forwarded to the upstream.
    pub exact_paths: Vec<String>,

    /// Largest POST/PUT body read from a client.
    pub max_body_bytes: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            upstream: "http://127.0.0.1:8081".to_string(),
            path_prefixes: vec!["/api/".to_string()],
            exact_paths: vec!["/report/collection_tracking0".to_string()],
            max_body_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound on one upstream exchange (headers and body) in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { upstream_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Emit JSON log lines instead of the pretty format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "debug".to_string(),
            json: false,
        }
    }
}
