//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → matcher.rs (longest segment-aligned prefix → controller type)
//!     → split remainder: first segment = action, rest = params
//!     → action_cache.rs (is the action callable? which invoker?)
//!     → router.rs (hooks, invoke with params[0..arity], templates, render)
//!     → Response, or the fixed 404
//!
//! Route registration (at startup):
//!     Router::map(path, controller type)
//!     → normalize path, last write wins
//!     → ActionCache::add (inherited actions collected once)
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always resolves to the same action

pub mod action_cache;
pub mod matcher;
pub mod router;

pub use action_cache::ActionCache;
pub use matcher::{normalize_route_path, split_segments, template_path, PathMatch, RouteTable};
pub use router::{not_found, DispatchError, NotFound, Router, Target, NOT_FOUND_BODY};
