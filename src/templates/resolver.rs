//! Filesystem template resolution.
//!
//! # Responsibilities
//! - Find `base_dir/path.*` (or the exact file when `path` has an extension)
//! - Fall back to a controller's default selector when nothing matches
//! - Resolve deferred (dynamic) selectors per request
//!
//! # Design Decisions
//! - Read-only; never creates files
//! - Glob matches are sorted, so the first match is deterministic
//! - Every filesystem probe is counted, which the locator's cache is judged by

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::controller::Controller;
use crate::observability::metrics;
use crate::templates::selector::{ResolvedTemplate, TemplateSelector};

/// Locates template files on disk.
#[derive(Debug, Default)]
pub struct FileResolver {
    probes: AtomicUsize,
}

impl FileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of filesystem probes performed so far.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }

    /// Find the file for a URL-style `path` (e.g. `/posts/show`) under `base_dir`.
    pub fn find(&self, base_dir: &Path, path: &str) -> Option<PathBuf> {
        self.probes.fetch_add(1, Ordering::Relaxed);
        metrics::record_template_probe();

        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            return None;
        }
        let candidate = base_dir.join(relative);

        if Path::new(relative).extension().is_some() {
            return candidate.is_file().then_some(candidate);
        }

        let pattern = format!("{}.*", glob::Pattern::escape(&candidate.to_string_lossy()));
        let found = glob::glob(&pattern)
            .ok()?
            .filter_map(Result::ok)
            .find(|p| p.is_file());

        tracing::trace!(pattern = %pattern, found = ?found, "Template probe");
        found
    }

    /// Look up the template for `path`, falling back to `default`.
    pub fn get_template_object(
        &self,
        base_dir: &Path,
        path: &str,
        default: Option<TemplateSelector>,
    ) -> ResolvedTemplate {
        if let Some(found) = self.find(base_dir, path) {
            return ResolvedTemplate::Path(found);
        }

        match default {
            None | Some(TemplateSelector::None) => ResolvedTemplate::None,
            Some(TemplateSelector::Fixed(name)) => self
                .find(base_dir, &sibling(dirname(path), &name))
                .map_or(ResolvedTemplate::None, ResolvedTemplate::Path),
            Some(TemplateSelector::Dynamic(selector)) => ResolvedTemplate::Deferred {
                base_dir: base_dir.to_path_buf(),
                dir: dirname(path).to_string(),
                selector,
            },
        }
    }

    /// Turn a (possibly deferred) template into a concrete file for this request.
    pub fn resolve_template(&self, template: &ResolvedTemplate, controller: &Controller) -> Option<PathBuf> {
        match template {
            ResolvedTemplate::None => None,
            ResolvedTemplate::Path(path) => Some(path.clone()),
            ResolvedTemplate::Deferred { base_dir, dir, selector } => {
                let name = selector(controller.action(), controller.params(), controller.request());
                if name.is_empty() {
                    return None;
                }
                self.find(base_dir, &sibling(dir, &name))
            }
        }
    }
}

/// Parent of a URL-style path; `/` for top-level entries.
fn dirname(path: &str) -> &str {
    match path.trim_end_matches('/').rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// `name` inside `dir`; names starting with `/` are taken from the base dir root.
fn sibling(dir: &str, name: &str) -> String {
    if name.starts_with('/') {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, file).unwrap();
        }
        dir
    }

    #[test]
    fn test_dirname_and_sibling() {
        assert_eq!(dirname("/posts/show"), "/posts");
        assert_eq!(dirname("/index"), "/");
        assert_eq!(sibling("/posts", "layout"), "/posts/layout");
        assert_eq!(sibling("/", "layout"), "/layout");
        assert_eq!(sibling("/posts", "/shared/layout"), "/shared/layout");
    }

    #[test]
    fn test_find_with_extension_wildcard() {
        let dir = tree(&["posts/show.html"]);
        let resolver = FileResolver::new();

        let found = resolver.find(dir.path(), "/posts/show").unwrap();
        assert_eq!(found, dir.path().join("posts/show.html"));
        assert!(resolver.find(dir.path(), "/posts/edit").is_none());
        assert_eq!(resolver.probe_count(), 2);
    }

    #[test]
    fn test_find_exact_when_extension_given() {
        let dir = tree(&["feed.xml", "feed.html"]);
        let resolver = FileResolver::new();

        assert_eq!(resolver.find(dir.path(), "/feed.xml").unwrap(), dir.path().join("feed.xml"));
        assert!(resolver.find(dir.path(), "/feed.txt").is_none());
    }

    #[test]
    fn test_directories_are_not_templates() {
        let dir = tree(&["posts.d/readme.txt"]);
        let resolver = FileResolver::new();
        assert!(resolver.find(dir.path(), "/posts").is_none());
    }

    #[test]
    fn test_fixed_default_is_looked_up_in_same_directory() {
        let dir = tree(&["posts/fallback.html"]);
        let resolver = FileResolver::new();

        let template = resolver.get_template_object(dir.path(), "/posts/show", Some("fallback".into()));
        match template {
            ResolvedTemplate::Path(path) => assert_eq!(path, dir.path().join("posts/fallback.html")),
            other => panic!("unexpected {other:?}"),
        }

        let missing = resolver.get_template_object(dir.path(), "/posts/show", Some("nope".into()));
        assert!(missing.is_none());
    }

    #[test]
    fn test_no_default_means_no_template() {
        let dir = tree(&[]);
        let resolver = FileResolver::new();
        assert!(resolver.get_template_object(dir.path(), "/posts/show", None).is_none());
        assert!(resolver
            .get_template_object(dir.path(), "/posts/show", Some(TemplateSelector::None))
            .is_none());
    }

    #[test]
    fn test_dynamic_default_is_deferred() {
        let dir = tree(&[]);
        let resolver = FileResolver::new();
        let selector = TemplateSelector::dynamic(|action, _, _| format!("{action}_alt"));

        let template = resolver.get_template_object(dir.path(), "/posts/show", Some(selector));
        match template {
            ResolvedTemplate::Deferred { dir, .. } => assert_eq!(dir, "/posts"),
            other => panic!("unexpected {other:?}"),
        }
        // Only the primary lookup touched the filesystem.
        assert_eq!(resolver.probe_count(), 1);
    }
}
