//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (ordered table lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: Dispatch { Proxy | Docs | Root | Tree }
//!
//! Table Compilation (at startup):
//!     DevServerConfig
//!     → proxy prefixes + exact paths (OR)
//!     → docs prefix
//!     → exact "/"
//!     → catch-all
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix/exact matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by priority)

pub mod matcher;
pub mod router;

pub use router::{Dispatch, RouteTable};
