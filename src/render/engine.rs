//! Template engines.
//!
//! The framework only picks template files; an engine turns a file plus a
//! context into text. [`TeraEngine`] is the default.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tera::Tera;

/// Error raised while rendering a template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to load template {path:?}")]
    Load {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },
    #[error("failed to render template {path:?}")]
    Render {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },
}

/// Renders a template file with a context.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, path: &Path, context: &tera::Context) -> Result<String, RenderError>;

    /// Forget compiled templates so edits on disk are picked up.
    fn clear(&self) {}
}

/// Tera-backed engine that compiles each template file on first use.
pub struct TeraEngine {
    tera: RwLock<Tera>,
}

impl TeraEngine {
    pub fn new() -> Self {
        Self {
            tera: RwLock::new(Tera::default()),
        }
    }

    fn ensure_loaded(&self, path: &Path, name: &str) -> Result<(), RenderError> {
        {
            let tera = self.tera.read().unwrap_or_else(PoisonError::into_inner);
            if tera.get_template_names().any(|n| n == name) {
                return Ok(());
            }
        }

        let mut tera = self.tera.write().unwrap_or_else(PoisonError::into_inner);
        tera.add_template_file(path, Some(name))
            .map_err(|source| RenderError::Load {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(template = %name, "Compiled template");
        Ok(())
    }
}

impl Default for TeraEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for TeraEngine {
    fn render(&self, path: &Path, context: &tera::Context) -> Result<String, RenderError> {
        let name = path.to_string_lossy();
        self.ensure_loaded(path, &name)?;

        let tera = self.tera.read().unwrap_or_else(PoisonError::into_inner);
        tera.render(&name, context).map_err(|source| RenderError::Render {
            path: path.to_path_buf(),
            source,
        })
    }

    fn clear(&self) {
        let mut tera = self.tera.write().unwrap_or_else(PoisonError::into_inner);
        *tera = Tera::default();
    }
}
