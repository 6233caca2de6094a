//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for an application.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for an MVC application.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings (bind address, limits).
    pub server: ServerConfig,

    /// Template lookup settings.
    pub templates: TemplateConfig,

    /// Application-wide controller defaults (last settings layer).
    pub controller: ControllerDefaults,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Development-mode behaviour.
    pub development: DevelopmentConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum buffered request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            request_timeout_secs: 30,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Template directories and caching.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Base directory for view templates.
    pub views_dir: String,

    /// Base directory for layout templates.
    pub layouts_dir: String,

    /// Lifetime of a cached template lookup in seconds (0 = never expires).
    pub cache_ttl_secs: u64,

    /// Watch the template directories and drop cached lookups on change.
    pub reload: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            views_dir: "views".to_string(),
            layouts_dir: "layouts".to_string(),
            cache_ttl_secs: 0,
            reload: false,
        }
    }
}

/// Controller settings applied when neither a controller nor any of its
/// ancestors define the value.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControllerDefaults {
    /// Action used when the path has no trailing segment.
    pub default_action: String,

    /// Fallback view name looked up next to the missing view.
    pub default_view: Option<String>,

    /// Fallback layout name looked up next to the missing layout.
    pub default_layout: Option<String>,
}

impl Default for ControllerDefaults {
    fn default() -> Self {
        Self {
            default_action: "index".to_string(),
            default_view: None,
            default_layout: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Development-mode configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DevelopmentConfig {
    /// Render the error chain into 500 responses instead of a generic body.
    pub show_exceptions: bool,
}
