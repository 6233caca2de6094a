//! Template lookup subsystem.
//!
//! # Data Flow
//! ```text
//! Controller (route_path, action, params, request)
//!     → locator.rs (key = route_path/action)
//!         → cache.rs hit: cached ResolvedTemplate
//!         → miss: resolver.rs glob `base_dir/path.*`
//!               → not found: default selector (selector.rs)
//!                   None → no template
//!                   Fixed(name) → glob `dirname(path)/name.*`
//!                   Dynamic(fn) → Deferred, resolved per request
//!     → Option<PathBuf> for the renderer
//!
//! On template change (reload enabled):
//!     watcher.rs → clear locator caches and compiled templates
//! ```
//!
//! # Design Decisions
//! - Missing templates are data (`None`), never errors
//! - Lookups are cached; only deferred selectors touch disk per request
//! - Views and layouts use separate caches and base directories

pub mod cache;
pub mod locator;
pub mod resolver;
pub mod selector;
pub mod watcher;

pub use cache::{CacheError, StoreOptions, TemplateCache};
pub use locator::{cache_key, TemplateKind, TemplateLocator};
pub use resolver::FileResolver;
pub use selector::{ResolvedTemplate, SelectorFn, TemplateSelector};
pub use watcher::TemplateWatcher;
