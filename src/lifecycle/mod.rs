//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Map routes → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     trigger() or Ctrl+C → stop accepting → drain in-flight requests → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routes, then listener
//! - Fail fast: any startup error is fatal

pub mod shutdown;

pub use shutdown::Shutdown;
