//! Per-request controller instance.
//!
//! # Responsibilities
//! - Carry the request, matched route, action and parameters
//! - Collect the response status, headers and render locals set by actions
//! - Hold the action outcome until the renderer consumes it

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;

use crate::controller::outcome::Outcome;
use crate::controller::types::ControllerType;

/// Request type handed to controllers: the body is fully buffered.
pub type Request = axum::http::Request<Bytes>;

/// Dispatch details published in request and response extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Controller type name.
    pub controller: String,
    /// Registered route path the request matched.
    pub route_path: String,
    /// Resolved action name.
    pub action: String,
    /// Trailing path segments after the action, in order.
    pub params: Vec<String>,
}

/// A controller instance bound to a single request.
pub struct Controller {
    controller_type: Arc<ControllerType>,
    request: Request,
    route_path: String,
    template_path: String,
    action: String,
    params: Vec<String>,
    status: StatusCode,
    headers: HeaderMap,
    locals: tera::Context,
    outcome: Outcome,
    halted: bool,
}

impl Controller {
    pub(crate) fn new(
        controller_type: Arc<ControllerType>,
        mut request: Request,
        route_match: RouteMatch,
        template_path: String,
    ) -> Self {
        request.extensions_mut().insert(route_match.clone());
        Self {
            controller_type,
            request,
            route_path: route_match.route_path,
            template_path,
            action: route_match.action,
            params: route_match.params,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            locals: tera::Context::new(),
            outcome: Outcome::Empty,
            halted: false,
        }
    }

    pub fn controller_type(&self) -> &Arc<ControllerType> {
        &self.controller_type
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Route path this controller is mounted at.
    pub fn route_path(&self) -> &str {
        &self.route_path
    }

    /// Path used for template lookup (`route_path/action`).
    pub fn template_path(&self) -> &str {
        &self.template_path
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// All trailing parameters, including those beyond the action's arity.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// First value of a query-string key.
    pub fn query(&self, name: &str) -> Option<String> {
        let query = self.request.uri().query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Value placed in request extensions by middleware (e.g. a session).
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.request.extensions().get::<T>()
    }

    /// Expose a value to the view and layout templates.
    pub fn assign<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.locals.insert(key, value);
    }

    pub fn locals(&self) -> &tera::Context {
        &self.locals
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Answer with `302 Found` and skip the remaining hooks, action and templates.
    pub fn redirect(&mut self, location: &str) -> Result<(), header::InvalidHeaderValue> {
        let value = HeaderValue::from_str(location)?;
        self.headers.insert(header::LOCATION, value);
        self.halt(StatusCode::FOUND, Outcome::Empty);
        Ok(())
    }

    /// Stop processing; the response is `status` with `outcome` as raw body.
    pub fn halt(&mut self, status: StatusCode, outcome: impl Into<Outcome>) {
        self.status = status;
        self.outcome = outcome.into();
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub(crate) fn set_outcome(&mut self, outcome: Outcome) {
        self.outcome = outcome;
    }

    /// Template context: assigned locals plus `controller`, `action` and `params`.
    pub fn render_context(&self) -> tera::Context {
        let mut context = self.locals.clone();
        context.insert("controller", self.controller_type.name());
        context.insert("action", &self.action);
        context.insert("params", &self.params);
        context
    }

    pub fn route_match(&self) -> RouteMatch {
        RouteMatch {
            controller: self.controller_type.name().to_string(),
            route_path: self.route_path.clone(),
            action: self.action.clone(),
            params: self.params.clone(),
        }
    }

    /// Status, headers and outcome for response assembly.
    pub(crate) fn into_response_parts(self) -> (StatusCode, HeaderMap, Outcome) {
        (self.status, self.headers, self.outcome)
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("controller", &self.controller_type.name())
            .field("route_path", &self.route_path)
            .field("action", &self.action)
            .field("params", &self.params)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(uri: &str) -> Controller {
        let ty = ControllerType::builder("Pages").build();
        let request = axum::http::Request::builder().uri(uri).body(Bytes::new()).unwrap();
        let route_match = RouteMatch {
            controller: "Pages".into(),
            route_path: "/pages".into(),
            action: "show".into(),
            params: vec!["about".into(), "extra".into()],
        };
        Controller::new(ty, request, route_match, "/pages/show".into())
    }

    #[test]
    fn test_route_match_in_request_extensions() {
        let c = controller("/pages/show/about/extra");
        let published = c.extension::<RouteMatch>().unwrap();
        assert_eq!(published.action, "show");
        assert_eq!(published.params, vec!["about", "extra"]);
    }

    #[test]
    fn test_query_decoding() {
        let c = controller("/pages/show?q=hello+world&page=2");
        assert_eq!(c.query("q").as_deref(), Some("hello world"));
        assert_eq!(c.query("page").as_deref(), Some("2"));
        assert!(c.query("missing").is_none());
    }

    #[test]
    fn test_render_context() {
        let mut c = controller("/pages/show/about");
        c.assign("title", "About us");
        let json = c.render_context().into_json();
        assert_eq!(json["title"], "About us");
        assert_eq!(json["controller"], "Pages");
        assert_eq!(json["action"], "show");
        assert_eq!(json["params"][0], "about");
    }

    #[test]
    fn test_redirect_halts() {
        let mut c = controller("/pages/show");
        c.redirect("/login").unwrap();
        assert!(c.is_halted());
        assert_eq!(c.status(), StatusCode::FOUND);
        assert_eq!(c.headers()[header::LOCATION], "/login");
    }
}
