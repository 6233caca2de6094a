//! Route path matching.
//!
//! # Responsibilities
//! - Normalize registered route paths
//! - Find the longest registered prefix of a request path (segment-aligned)
//! - Split the unmatched remainder into segments
//!
//! # Design Decisions
//! - Prefixes only match on segment boundaries (`/sub1` never matches `/sub10`)
//! - Every route is a catch-all; a trailing `/*` is accepted and ignored
//! - Path matching is case-sensitive
//! - No regex: one hash lookup per path segment

use std::collections::HashMap;
use std::sync::Arc;

use crate::controller::ControllerType;

/// Canonical form of a route path: leading `/`, no trailing `/` or `/*`.
pub fn normalize_route_path(path: &str) -> String {
    let trimmed = path.trim();
    let trimmed = trimmed.strip_suffix('*').unwrap_or(trimmed);
    let trimmed = trimmed.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Non-empty `/`-separated segments of `path`.
pub fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Template lookup path for a request: `request_path` with one trailing
/// segment removed per consumed parameter, plus `implied_action` when the
/// action came from configuration instead of the path.
pub fn template_path(request_path: &str, consumed: usize, implied_action: Option<&str>) -> String {
    let mut segments = split_segments(request_path);
    segments.truncate(segments.len().saturating_sub(consumed));
    if let Some(action) = implied_action {
        segments.push(action.to_string());
    }
    format!("/{}", segments.join("/"))
}

/// A successful route match.
#[derive(Debug)]
pub struct PathMatch<'a> {
    /// The registered (normalized) route path.
    pub route_path: &'a str,
    pub controller: &'a Arc<ControllerType>,
    /// Unmatched part of the request path, starting with `/` or empty.
    pub remainder: &'a str,
}

/// Route paths mapped to controller types.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, Arc<ControllerType>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route, returning the controller it replaced.
    pub fn insert(&mut self, path: &str, controller: Arc<ControllerType>) -> Option<Arc<ControllerType>> {
        self.routes.insert(normalize_route_path(path), controller)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<ControllerType>)> {
        let mut routes: Vec<_> = self.routes.iter().map(|(p, c)| (p.as_str(), c)).collect();
        routes.sort_by(|a, b| a.0.cmp(b.0));
        routes.into_iter()
    }

    /// Longest registered prefix of `path`.
    pub fn find<'a>(&'a self, path: &'a str) -> Option<PathMatch<'a>> {
        let mut candidate = path.trim_end_matches('/');
        loop {
            let key = if candidate.is_empty() { "/" } else { candidate };
            if let Some((route_path, controller)) = self.routes.get_key_value(key) {
                return Some(PathMatch {
                    route_path,
                    controller,
                    remainder: &path[candidate.len()..],
                });
            }
            if candidate.is_empty() {
                return None;
            }
            candidate = &candidate[..candidate.rfind('/').unwrap_or(0)];
        }
    }
}
