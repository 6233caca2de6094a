//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router that feeds every request to the MVC router
//! - Wire up middleware (tracing, timeout, request ID)
//! - Buffer request bodies up to the configured limit
//! - Map dispatch errors to 500 responses
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::controller::RouteMatch;
use crate::http::response::{error_response, payload_too_large};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::Router as MvcRouter;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<MvcRouter>,
    pub max_body_size: usize,
    pub show_exceptions: bool,
}

/// HTTP front end for an MVC router.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig, mvc: Arc<MvcRouter>) -> Self {
        let state = AppState {
            router: mvc,
            max_body_size: config.server.max_body_size,
            show_exceptions: config.development.show_exceptions,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The Axum router, for serving with a custom listener or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.signal().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Buffer the request and hand it to the MVC router.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %parts.uri.path(), error = %e, "Request body rejected");
            metrics::record_request(413, start_time);
            return payload_too_large();
        }
    };
    let request = Request::from_parts(parts, bytes);
    let path = request.uri().path().to_string();

    let router = Arc::clone(&state.router);
    let response = match tokio::task::spawn_blocking(move || router.route(request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!(path = %path, error = %crate::http::response::error_chain(&e), "Request failed");
            error_response(&e, state.show_exceptions)
        }
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Dispatch task panicked");
            (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    };

    if let Some(route_match) = response.extensions().get::<RouteMatch>() {
        tracing::debug!(
            path = %path,
            controller = %route_match.controller,
            action = %route_match.action,
            status = response.status().as_u16(),
            "Request dispatched"
        );
    }
    metrics::record_request(response.status().as_u16(), start_time);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, ControllerType};
    use tower::ServiceExt;

    fn server(config: AppConfig) -> HttpServer {
        let mut mvc = MvcRouter::new(&config);
        let echo = ControllerType::builder("Echo")
            .action("body", |c: &mut Controller| {
                String::from_utf8_lossy(c.request().body()).into_owned()
            })
            .build();
        mvc.map("/echo", &echo);
        HttpServer::new(config, Arc::new(mvc))
    }

    #[tokio::test]
    async fn test_body_is_buffered_for_actions() {
        let app = server(AppConfig::default()).router();
        let response = app
            .oneshot(Request::post("/echo/body").body(Body::from("hello")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert!(response.headers().contains_key("x-request-id"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mut config = AppConfig::default();
        config.server.max_body_size = 4;
        let app = server(config).router();
        let response = app
            .oneshot(Request::post("/echo/body").body(Body::from("too long")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 413);
    }
}
