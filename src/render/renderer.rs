//! Response assembly for a dispatched controller.
//!
//! A layout receives the rendered view as the `content` variable. Tera
//! autoescapes `.html` templates, so layouts must write `{{ content | safe }}`
//! to embed the view's markup unescaped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue};
use axum::response::Response;

use crate::controller::Controller;
use crate::render::engine::{RenderError, TemplateEngine};

/// Context key under which a layout receives the rendered view.
///
/// The value is a plain string; in autoescaped layouts use `{{ content | safe }}`.
pub const CONTENT_KEY: &str = "content";

/// Produces the final response from a controller and its templates.
#[derive(Clone)]
pub struct Renderer {
    engine: Arc<dyn TemplateEngine>,
}

impl Renderer {
    pub fn new(engine: Arc<dyn TemplateEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<dyn TemplateEngine> {
        &self.engine
    }

    /// Render `view` (wrapped in `layout` when present) with the controller
    /// as context, or write the raw action outcome when there is no view.
    pub fn render(
        &self,
        controller: Controller,
        view: Option<PathBuf>,
        layout: Option<PathBuf>,
    ) -> Result<Response, RenderError> {
        let Some(view) = view else {
            return Ok(Self::raw(controller));
        };

        let mut context = controller.render_context();
        let mut body = self.engine.render(&view, &context)?;
        if let Some(layout) = layout {
            context.insert(CONTENT_KEY, &body);
            body = self.engine.render(&layout, &context)?;
        }

        let route_match = controller.route_match();
        let (status, headers, _) = controller.into_response_parts();
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
            .headers_mut()
            .entry(header::CONTENT_TYPE)
            .or_insert_with(|| content_type_for(&view));
        response.extensions_mut().insert(route_match);
        Ok(response)
    }

    /// Response carrying the controller's outcome as-is.
    pub fn raw(controller: Controller) -> Response {
        let route_match = controller.route_match();
        let (status, headers, outcome) = controller.into_response_parts();
        let content_type = outcome.content_type();

        let mut response = Response::new(Body::from(outcome.into_body()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        if let Some(content_type) = content_type {
            response
                .headers_mut()
                .entry(header::CONTENT_TYPE)
                .or_insert(content_type);
        }
        response.extensions_mut().insert(route_match);
        response
    }
}

/// Content type from the first recognised extension, so `show.json.tera`
/// is served as JSON. Defaults to HTML.
fn content_type_for(path: &Path) -> HeaderValue {
    let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let content_type = file_name
        .split('.')
        .skip(1)
        .find_map(|ext| match ext {
            "html" | "htm" => Some("text/html; charset=utf-8"),
            "json" => Some("application/json"),
            "txt" | "text" => Some("text/plain; charset=utf-8"),
            "xml" => Some("application/xml"),
            "csv" => Some("text/csv"),
            _ => None,
        })
        .unwrap_or("text/html; charset=utf-8");
    HeaderValue::from_static(content_type)
}
