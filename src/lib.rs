//! Local development front-end library.
//!
//! Serves a static build tree with nginx-style `try_files` semantics and
//! forwards API paths to a remote upstream, keeping one cookie session.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod nginx;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod site;

pub use config::schema::DevServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
