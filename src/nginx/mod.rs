//! Emulated routing-document subsystem.
//!
//! # Data Flow
//! ```text
//! nginx.conf (read once, on the first request needing it)
//!     → extract.rs (tokenize, find `location <prefix>`, read `try_files`)
//!     → RouteRule, or the built-in default on any failure
//!     → cache.rs (memoized for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - Extraction failure is never fatal and never reaches the client
//! - Only one directive of one block is understood

pub mod cache;
pub mod extract;

pub use cache::RuleCache;
pub use extract::{extract, ExtractError};
