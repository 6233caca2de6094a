//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → buffer body (max_body_size) → Request<Bytes>
//!     → routing::Router::route on the blocking pool
//!     → response.rs (500 for dispatch errors, 413 for large bodies)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::{error_chain, error_response};
pub use server::{AppState, HttpServer};
