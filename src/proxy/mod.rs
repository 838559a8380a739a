//! Reverse proxy subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request (proxied path)
//!     → forward.rs (upstream URI, body, timeout)
//!     → headers.rs (outbound header set + session cookies from cookies.rs)
//!     → hyper client (single attempt, redirects surfaced as-is)
//!     → cookies.rs (split folded Set-Cookie, record in jar)
//!     → headers.rs (client header set, one Set-Cookie per directive)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - The cookie jar is owned by the `Forwarder` and injected at construction
//! - One shared session for all clients, matching a single browser login

pub mod cookies;
pub mod forward;
pub mod headers;

pub use cookies::{split_set_cookie, CookieJar};
pub use forward::{Forwarder, ProxyError};
