//! Shared utilities for integration tests.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tempfile::TempDir;
use tower::ServiceExt;

use mvc_core::{AppConfig, HttpServer, Router};

/// A temporary `views/` + `layouts/` tree.
pub struct TemplateTree {
    dir: TempDir,
}

impl TemplateTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("views")).unwrap();
        fs::create_dir_all(dir.path().join("layouts")).unwrap();
        Self { dir }
    }

    /// Write `views/<path>`.
    pub fn view(self, path: &str, contents: &str) -> Self {
        write(&self.dir.path().join("views"), path, contents);
        self
    }

    /// Write `layouts/<path>`.
    pub fn layout(self, path: &str, contents: &str) -> Self {
        write(&self.dir.path().join("layouts"), path, contents);
        self
    }

    /// Default config pointed at this tree.
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.templates.views_dir = self.dir.path().join("views").to_string_lossy().into_owned();
        config.templates.layouts_dir = self.dir.path().join("layouts").to_string_lossy().into_owned();
        config
    }
}

fn write(base: &Path, path: &str, contents: &str) {
    let file = base.join(path);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(file, contents).unwrap();
}

/// Serve `router` through the full HTTP stack.
pub fn server(config: AppConfig, router: Router) -> HttpServer {
    HttpServer::new(config, Arc::new(router))
}

/// Send a GET in-process and collect status and body.
#[allow(dead_code)]
pub async fn get(server: &HttpServer, uri: &str) -> (StatusCode, String) {
    let response = server
        .router()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}
