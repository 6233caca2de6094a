//! Controller subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ControllerType::builder(name)
//!         .extends(&parent) / .action(name, handler) / .before(hook)
//!     → types.rs (immutable ControllerType, Arc-shared)
//!     → routing::ActionCache (action sets precomputed per type)
//!
//! Per request:
//!     context.rs (fresh Controller bound to request + params)
//!     → hooks + handler.rs (invoke action with params[0..arity])
//!     → outcome.rs (raw result if no view template is found)
//! ```
//!
//! # Design Decisions
//! - Actions are registered closures, not reflected methods
//! - Arity comes from the closure signature (0..=4 Strings or Vec<String>)
//! - A new Controller per request; nothing is shared between requests

pub mod context;
pub mod handler;
pub mod outcome;
pub mod types;

pub use context::{Controller, Request, RouteMatch};
pub use handler::{Action, ActionError, ActionResult, Arity, Handler, IntoActionResult};
pub use outcome::Outcome;
pub use types::{ControllerId, ControllerSettings, ControllerType, ControllerTypeBuilder, Hook};
