//! Template selectors and resolved templates.

use std::path::PathBuf;
use std::sync::Arc;

use crate::controller::Request;

/// Computes a template name from `(action, params, request)`.
pub type SelectorFn = dyn Fn(&str, &[String], &Request) -> String + Send + Sync;

/// How to find a fallback view or layout.
#[derive(Clone)]
pub enum TemplateSelector {
    /// Explicitly no template; stops the settings lookup.
    None,
    /// A template name looked up next to the missing template.
    Fixed(String),
    /// A name computed per request.
    Dynamic(Arc<SelectorFn>),
}

impl TemplateSelector {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&str, &[String], &Request) -> String + Send + Sync + 'static,
    {
        TemplateSelector::Dynamic(Arc::new(f))
    }
}

impl From<&str> for TemplateSelector {
    fn from(name: &str) -> Self {
        TemplateSelector::Fixed(name.to_string())
    }
}

impl From<String> for TemplateSelector {
    fn from(name: String) -> Self {
        TemplateSelector::Fixed(name)
    }
}

impl std::fmt::Debug for TemplateSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSelector::None => f.write_str("None"),
            TemplateSelector::Fixed(name) => f.debug_tuple("Fixed").field(name).finish(),
            TemplateSelector::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Outcome of a cached template lookup.
#[derive(Clone)]
pub enum ResolvedTemplate {
    /// No template; the raw action outcome is rendered.
    None,
    /// A template file on disk.
    Path(PathBuf),
    /// A dynamic selector, resolved per request inside `dir` of `base_dir`.
    Deferred {
        base_dir: PathBuf,
        dir: String,
        selector: Arc<SelectorFn>,
    },
}

impl ResolvedTemplate {
    pub fn is_none(&self) -> bool {
        matches!(self, ResolvedTemplate::None)
    }
}

impl std::fmt::Debug for ResolvedTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedTemplate::None => f.write_str("None"),
            ResolvedTemplate::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ResolvedTemplate::Deferred { base_dir, dir, .. } => f
                .debug_struct("Deferred")
                .field("base_dir", base_dir)
                .field("dir", dir)
                .finish_non_exhaustive(),
        }
    }
}
