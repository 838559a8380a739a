//! Startup orchestration.
//!
//! # Responsibilities
//! - Check the served tree and its docs subtree exist (fatal otherwise)
//! - Warn when the routing document is missing (defaults apply)
//! - Log a summary of what is being served and proxied
//!
//! # Design Decisions
//! - Fail fast: missing directories are the only fatal startup errors
//! - The routing document is only read later, on first use

use std::path::PathBuf;
use thiserror::Error;

use crate::config::DevServerConfig;

/// Fatal startup conditions.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("served tree `{0}` does not exist")]
    MissingRoot(PathBuf),

    #[error("docs directory `{0}` does not exist")]
    MissingDocs(PathBuf),
}

impl StartupError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Verify the directories the server cannot run without.
pub fn preflight(config: &DevServerConfig) -> Result<(), StartupError> {
    let site = &config.site;
    if !site.root.is_dir() {
        return Err(StartupError::MissingRoot(site.root.clone()));
    }

    let docs = site.docs_dir();
    if !docs.is_dir() {
        return Err(StartupError::MissingDocs(docs));
    }

    if !site.nginx_conf.is_file() {
        tracing::warn!(
            document = %site.nginx_conf.display(),
            "Routing document not found, default try_files rules will be used"
        );
    }
    Ok(())
}

/// Log what this process serves.
pub fn log_summary(config: &DevServerConfig) {
    tracing::info!(
        root = %config.site.root.display(),
        docs = %config.site.docs_dir().display(),
        routing_document = %config.site.nginx_conf.display(),
        upstream = %config.proxy.upstream,
        proxied_prefixes = ?config.proxy.path_prefixes,
        proxied_paths = ?config.proxy.exact_paths,
        "Configuration loaded"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(root: PathBuf) -> DevServerConfig {
        let mut config = DevServerConfig::default();
        config.site.nginx_conf = root.join("nginx.conf");
        config.site.root = root;
        config
    }

    #[test]
    fn missing_root() {
        let config = config_for(PathBuf::from("/no/such/dist"));
        assert!(matches!(preflight(&config), Err(StartupError::MissingRoot(_))));
    }

    #[test]
    fn missing_docs() {
        let dir = TempDir::new().unwrap();
        let config = config_for(dir.path().to_path_buf());
        let err = preflight(&config).unwrap_err();
        assert!(matches!(err, StartupError::MissingDocs(_)));
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn missing_routing_document_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        assert!(preflight(&config_for(dir.path().to_path_buf())).is_ok());
    }
}
