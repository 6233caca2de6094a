//! Rendering subsystem.
//!
//! # Data Flow
//! ```text
//! (Controller, view: Option<PathBuf>, layout: Option<PathBuf>)
//!     → renderer.rs
//!         view present:  engine.rs renders view with controller context
//!                        → layout present: render layout with `content` = view output
//!         view absent:   raw action outcome becomes the body
//!     → Response (status, headers, body, RouteMatch extension)
//! ```
//!
//! # Design Decisions
//! - The engine is a trait object; Tera is the default implementation
//! - Statuses and headers set by the action always survive rendering
//! - A layout without a view is ignored

pub mod engine;
pub mod renderer;

pub use engine::{RenderError, TemplateEngine, TeraEngine};
pub use renderer::{Renderer, CONTENT_KEY};
