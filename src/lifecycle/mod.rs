//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Preflight directories → Log summary → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or broadcast → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Missing served tree or docs subtree exits non-zero before binding
//! - A missing routing document only warns

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{preflight, StartupError};
