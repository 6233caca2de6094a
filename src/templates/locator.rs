//! View and layout lookup for controller actions.
//!
//! # Responsibilities
//! - Map a controller action to its view and layout templates
//! - Cache lookups per `route_path/action` key (views and layouts separately)
//! - Resolve dynamic selectors per request after the cached lookup
//!
//! # Design Decisions
//! - Cache keys ignore parameters: every `/posts/show/<id>` shares one lookup
//! - Deferred selectors are cached unresolved since their result varies
//! - Cache TTL comes from config (`0` = entries never expire)

use std::path::{Path, PathBuf};

use crate::config::{ControllerDefaults, TemplateConfig};
use crate::controller::Controller;
use crate::observability::metrics;
use crate::templates::cache::{StoreOptions, TemplateCache};
use crate::templates::resolver::FileResolver;
use crate::templates::selector::ResolvedTemplate;

/// Which template family a lookup is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    View,
    Layout,
}

impl TemplateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::View => "view",
            TemplateKind::Layout => "layout",
        }
    }
}

/// Cached view/layout locator.
pub struct TemplateLocator {
    resolver: FileResolver,
    views_dir: PathBuf,
    layouts_dir: PathBuf,
    store_options: StoreOptions,
    defaults: ControllerDefaults,
    view_cache: TemplateCache<ResolvedTemplate>,
    layout_cache: TemplateCache<ResolvedTemplate>,
}

impl TemplateLocator {
    pub fn new(config: &TemplateConfig, defaults: ControllerDefaults) -> Self {
        Self {
            resolver: FileResolver::new(),
            views_dir: PathBuf::from(&config.views_dir),
            layouts_dir: PathBuf::from(&config.layouts_dir),
            store_options: StoreOptions::expires_in(config.cache_ttl_secs),
            defaults,
            view_cache: TemplateCache::new(),
            layout_cache: TemplateCache::new(),
        }
    }

    pub fn resolver(&self) -> &FileResolver {
        &self.resolver
    }

    pub fn views_dir(&self) -> &Path {
        &self.views_dir
    }

    pub fn layouts_dir(&self) -> &Path {
        &self.layouts_dir
    }

    /// Cached view lookup for the controller's action.
    pub fn get_view(&self, controller: &Controller) -> ResolvedTemplate {
        self.lookup(TemplateKind::View, controller)
    }

    /// Cached layout lookup for the controller's action.
    pub fn get_layout(&self, controller: &Controller) -> ResolvedTemplate {
        self.lookup(TemplateKind::Layout, controller)
    }

    /// Concrete view file for this request, if any.
    pub fn view_path(&self, controller: &Controller) -> Option<PathBuf> {
        let template = self.get_view(controller);
        self.resolver.resolve_template(&template, controller)
    }

    /// Concrete layout file for this request, if any.
    pub fn layout_path(&self, controller: &Controller) -> Option<PathBuf> {
        let template = self.get_layout(controller);
        self.resolver.resolve_template(&template, controller)
    }

    /// Drop every cached lookup.
    pub fn clear(&self) {
        self.view_cache.clear();
        self.layout_cache.clear();
    }

    fn lookup(&self, kind: TemplateKind, controller: &Controller) -> ResolvedTemplate {
        let key = cache_key(controller.route_path(), controller.action());
        let (cache, base_dir) = match kind {
            TemplateKind::View => (&self.view_cache, &self.views_dir),
            TemplateKind::Layout => (&self.layout_cache, &self.layouts_dir),
        };

        let mut miss = false;
        let template = cache.fetch_or_store_with(&key, self.store_options, || {
            miss = true;
            let ty = controller.controller_type();
            let default = match kind {
                TemplateKind::View => ty.default_view(&self.defaults),
                TemplateKind::Layout => ty.default_layout(&self.defaults),
            };
            self.resolver
                .get_template_object(base_dir, controller.template_path(), default)
        });

        metrics::record_template_lookup(kind.as_str(), !miss);
        tracing::debug!(
            kind = kind.as_str(),
            key = %key,
            cached = !miss,
            template = ?template,
            "Template lookup"
        );
        template
    }
}

/// `route_path/action`, with the `//` of root-mounted controllers collapsed.
pub fn cache_key(route_path: &str, action: &str) -> String {
    let key = format!("{route_path}/{action}");
    match key.strip_prefix("//") {
        Some(rest) => format!("/{rest}"),
        None => key,
    }
}
