//! Convention-based MVC request dispatch.
//!
//! Map path prefixes to controller types; a request `/prefix/action/p1/p2`
//! runs `action` with `p1`, `p2` and renders the matching view inside its
//! layout.

pub mod config;
pub mod controller;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;
pub mod templates;

pub use config::AppConfig;
pub use controller::{Controller, ControllerType, Outcome, Request};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::Router;
pub use templates::TemplateSelector;
