//! Template directory watcher for development reloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches template directories and calls back on any change.
pub struct TemplateWatcher {
    dirs: Vec<PathBuf>,
}

impl TemplateWatcher {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            dirs: dirs.into_iter().map(|d| d.as_ref().to_path_buf()).collect(),
        }
    }

    /// Start watching in a background thread. Dropping the returned watcher stops it.
    pub fn run<F>(self, on_change: F) -> Result<RecommendedWatcher, notify::Error>
    where
        F: Fn() + Send + 'static,
    {
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        tracing::info!(paths = ?event.paths, "Template change detected, clearing caches");
                        on_change();
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for dir in &self.dirs {
            if dir.is_dir() {
                watcher.watch(dir, RecursiveMode::Recursive)?;
                tracing::info!(path = ?dir, "Template watcher started");
            } else {
                tracing::warn!(path = ?dir, "Template directory missing, not watched");
            }
        }
        Ok(watcher)
    }
}
