//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store routes and their precomputed action tables
//! - Resolve a request path to (controller, action, params) or an explicit 404
//! - Drive hooks, action invocation, template lookup and rendering
//!
//! # Design Decisions
//! - Mapping happens at startup (`&mut self`); dispatch is `&self` and lock-free
//! - Duplicate route paths: last registration wins, with a warning
//! - Missing routes and actions are 404 responses, not errors
//! - Application errors propagate to the HTTP layer untouched

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;

use crate::config::{AppConfig, ControllerDefaults};
use crate::controller::{Action, ActionError, Arity, Controller, ControllerType, Request, RouteMatch};
use crate::render::{RenderError, Renderer, TemplateEngine, TeraEngine};
use crate::routing::action_cache::ActionCache;
use crate::routing::matcher::{split_segments, template_path, RouteTable};
use crate::templates::TemplateLocator;

/// Fixed body of every 404 produced by the router.
pub const NOT_FOUND_BODY: &str = "404 Not found";

/// Error raised while dispatching a matched request.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{controller}#{action} failed")]
    Action {
        controller: String,
        action: String,
        #[source]
        source: ActionError,
    },
    #[error("{controller}#{action} expects {expected} parameters, got {given}")]
    MissingParams {
        controller: String,
        action: String,
        expected: usize,
        given: usize,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Why a request resolved to no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    NoRoute,
    NoAction,
}

/// A request resolved to a callable action.
#[derive(Debug)]
pub struct Target {
    pub controller: Arc<ControllerType>,
    pub route_path: String,
    pub action: Arc<Action>,
    pub params: Vec<String>,
    /// Whether the action name came from the default-action setting.
    pub implied_action: bool,
}

impl Target {
    pub fn action_name(&self) -> &str {
        self.action.name()
    }
}

/// The MVC router: route table, action tables, template locator and renderer.
pub struct Router {
    routes: RouteTable,
    actions: ActionCache,
    defaults: ControllerDefaults,
    locator: TemplateLocator,
    renderer: Renderer,
}

impl Router {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_engine(config, Arc::new(TeraEngine::new()))
    }

    pub fn with_engine(config: &AppConfig, engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            routes: RouteTable::new(),
            actions: ActionCache::new(),
            defaults: config.controller.clone(),
            locator: TemplateLocator::new(&config.templates, config.controller.clone()),
            renderer: Renderer::new(engine),
        }
    }

    /// Register `path` → `controller`.
    pub fn map(&mut self, path: &str, controller: &Arc<ControllerType>) -> &mut Self {
        self.actions.add(controller);
        match self.routes.insert(path, Arc::clone(controller)) {
            Some(previous) => tracing::warn!(
                path = %path,
                previous = %previous.name(),
                controller = %controller.name(),
                "Route overwritten"
            ),
            None => tracing::debug!(path = %path, controller = %controller.name(), "Route mapped"),
        }
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn actions(&self) -> &ActionCache {
        &self.actions
    }

    pub fn locator(&self) -> &TemplateLocator {
        &self.locator
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Drop cached template lookups and compiled templates.
    pub fn clear_template_caches(&self) {
        self.locator.clear();
        self.renderer.engine().clear();
    }

    /// Resolve a request path to its target action.
    pub fn resolve(&self, path: &str) -> Result<Target, NotFound> {
        let matched = self.routes.find(path).ok_or(NotFound::NoRoute)?;
        let controller = matched.controller;

        let mut segments = split_segments(matched.remainder).into_iter();
        let (action_name, implied_action) = match segments.next() {
            Some(action) => (action, false),
            None => (controller.default_action(&self.defaults).to_string(), true),
        };

        if !self.actions.is_present(controller.id(), &action_name) {
            return Err(NotFound::NoAction);
        }
        let action = self
            .actions
            .invoker(controller.id(), &action_name)
            .ok_or(NotFound::NoAction)?;

        Ok(Target {
            controller: Arc::clone(controller),
            route_path: matched.route_path.to_string(),
            action: Arc::clone(action),
            params: segments.collect(),
            implied_action,
        })
    }

    /// Dispatch a request and build its response.
    pub fn route(&self, request: Request) -> Result<Response, DispatchError> {
        let path = request.uri().path().to_string();

        let target = match self.resolve(&path) {
            Ok(target) => target,
            Err(reason) => {
                tracing::debug!(path = %path, reason = ?reason, "Not found");
                return Ok(not_found());
            }
        };

        let controller_name = target.controller.name().to_string();
        let action_name = target.action_name().to_string();
        tracing::debug!(
            path = %path,
            controller = %controller_name,
            action = %action_name,
            params = target.params.len(),
            "Dispatching"
        );

        let bound = target
            .action
            .bind(&target.params)
            .ok_or_else(|| DispatchError::MissingParams {
                controller: controller_name.clone(),
                action: action_name.clone(),
                expected: match target.action.arity() {
                    Arity::Fixed(n) => n,
                    Arity::Variadic => 0,
                },
                given: target.params.len(),
            })?
            .to_vec();

        let lookup_path = template_path(
            &path,
            target.params.len(),
            target.implied_action.then_some(action_name.as_str()),
        );
        let route_match = RouteMatch {
            controller: controller_name.clone(),
            route_path: target.route_path.clone(),
            action: action_name.clone(),
            params: target.params.clone(),
        };
        let mut controller = Controller::new(Arc::clone(&target.controller), request, route_match, lookup_path);

        let fail = |source: ActionError| DispatchError::Action {
            controller: controller_name.clone(),
            action: action_name.clone(),
            source,
        };

        for hook in target.controller.before_hooks(&action_name) {
            hook.run(&mut controller).map_err(fail)?;
            if controller.is_halted() {
                tracing::debug!(controller = %controller_name, action = %action_name, "Halted by before hook");
                return Ok(Renderer::raw(controller));
            }
        }

        let outcome = target.action.invoke(&mut controller, &bound).map_err(fail)?;
        if !controller.is_halted() {
            controller.set_outcome(outcome);
        }

        for hook in target.controller.after_hooks(&action_name) {
            hook.run(&mut controller).map_err(fail)?;
        }

        if controller.is_halted() {
            return Ok(Renderer::raw(controller));
        }

        let view = self.locator.view_path(&controller);
        let layout = view.as_ref().and_then(|_| self.locator.layout_path(&controller));
        Ok(self.renderer.render(controller, view, layout)?)
    }
}

/// The fixed `404 Not found` response.
pub fn not_found() -> Response {
    let mut response = Response::new(NOT_FOUND_BODY.into());
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Outcome;

    fn router() -> Router {
        let mut config = AppConfig::default();
        config.templates.views_dir = "/nonexistent/views".into();
        config.templates.layouts_dir = "/nonexistent/layouts".into();
        let mut router = Router::new(&config);

        let sub1 = ControllerType::builder("Sub1")
            .action("index", |_: &mut Controller| "sub1 index")
            .build();
        let ctrl = ControllerType::builder("Ctrl")
            .action("pair", |_: &mut Controller, a: String, b: String| format!("{a}+{b}"))
            .action("all", |_: &mut Controller, rest: Vec<String>| rest.join(","))
            .default_action("all")
            .build();
        router.map("/sub1", &sub1).map("/ctrl", &ctrl);
        router
    }

    #[test]
    fn test_resolve_action_and_params() {
        let router = router();
        let target = router.resolve("/ctrl/pair/a/b/c").unwrap();
        assert_eq!(target.controller.name(), "Ctrl");
        assert_eq!(target.route_path, "/ctrl");
        assert_eq!(target.action_name(), "pair");
        assert_eq!(target.params, vec!["a", "b", "c"]);
        assert!(!target.implied_action);
    }

    #[test]
    fn test_resolve_default_action() {
        let router = router();
        let target = router.resolve("/sub1/").unwrap();
        assert_eq!(target.action_name(), "index");
        assert!(target.params.is_empty());
        assert!(target.implied_action);

        // Controller-level default overrides the application default.
        assert_eq!(router.resolve("/ctrl").unwrap().action_name(), "all");
    }

    #[test]
    fn test_resolve_not_found() {
        let router = router();
        assert_eq!(router.resolve("/nosuchurl").unwrap_err(), NotFound::NoRoute);
        assert_eq!(router.resolve("/sub1/foo").unwrap_err(), NotFound::NoAction);
        assert_eq!(router.resolve("/sub1/foo/1/2").unwrap_err(), NotFound::NoAction);
    }

    #[test]
    fn test_last_mapping_wins() {
        let mut router = router();
        let replacement = ControllerType::builder("Replacement")
            .action("index", |_: &mut Controller| Outcome::Empty)
            .build();
        router.map("/sub1/", &replacement);

        assert_eq!(router.routes().len(), 2);
        assert_eq!(router.resolve("/sub1").unwrap().controller.name(), "Replacement");
    }

    #[test]
    fn test_missing_params_is_an_error() {
        let router = router();
        let request = axum::http::Request::builder()
            .uri("/ctrl/pair/only")
            .body(Default::default())
            .unwrap();
        let err = router.route(request).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::MissingParams { expected: 2, given: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_clear_template_caches_picks_up_new_view() {
        let root = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.templates.views_dir = root.path().join("views").to_string_lossy().into_owned();
        config.templates.layouts_dir = root.path().join("layouts").to_string_lossy().into_owned();
        let mut router = Router::new(&config);
        let posts = ControllerType::builder("Posts")
            .action("show", |_: &mut Controller| "raw")
            .build();
        router.map("/posts", &posts);

        let dispatch = |router: &Router| {
            let request = axum::http::Request::builder()
                .uri("/posts/show")
                .body(Default::default())
                .unwrap();
            router.route(request).unwrap()
        };
        let body = |response: Response| async move {
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            String::from_utf8(bytes.to_vec()).unwrap()
        };

        assert_eq!(body(dispatch(&router)).await, "raw");

        let view = root.path().join("views/posts/show.html");
        std::fs::create_dir_all(view.parent().unwrap()).unwrap();
        std::fs::write(&view, "rendered").unwrap();
        // The missing view is still cached.
        assert_eq!(body(dispatch(&router)).await, "raw");

        router.clear_template_caches();
        assert_eq!(body(dispatch(&router)).await, "rendered");
    }

    #[test]
    fn test_not_found_response() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    }
}
