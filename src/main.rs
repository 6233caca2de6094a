//! Demo application for the MVC dispatcher.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing::Router ──▶ controller action
//!                                           │                    │
//!                                           ▼                    ▼
//!                                   templates::locator ──▶ render::Renderer
//!                                   (view + layout)        (tera)
//!     Client Response ◀─────────────────────────────────────────┘
//! ```
//!
//! `mvc-demo serve` runs the demo controllers against `demo/views` and
//! `demo/layouts`; `mvc-demo routes` prints the route table.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::StatusCode;
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::net::TcpListener;

use mvc_core::config::{load_config, AppConfig};
use mvc_core::controller::{Controller, ControllerType};
use mvc_core::observability::{logging, metrics};
use mvc_core::templates::{TemplateSelector, TemplateWatcher};
use mvc_core::{HttpServer, Router, Shutdown};

#[derive(Parser)]
#[command(name = "mvc-demo")]
#[command(about = "Convention-based MVC demo server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the demo application
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override server.bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Print the route table and each controller's actions
    Routes {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, bind } => {
            let mut config = read_config(config.as_deref())?;
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            serve(config).await
        }
        Commands::Routes { config } => {
            let config = read_config(config.as_deref())?;
            print_routes(&demo_router(&config));
            Ok(())
        }
    }
}

fn read_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(AppConfig::default()),
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    logging::init(&config.observability.log_level);

    tracing::info!("mvc-demo v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        views_dir = %config.templates.views_dir,
        layouts_dir = %config.templates.layouts_dir,
        cache_ttl_secs = config.templates.cache_ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let router = Arc::new(demo_router(&config));

    // Dropping the watcher stops it, so keep it alive for the server's lifetime.
    let _watcher = if config.templates.reload {
        let watched = Arc::clone(&router);
        let watcher = TemplateWatcher::new([&config.templates.views_dir, &config.templates.layouts_dir])
            .run(move || watched.clear_template_caches())?;
        Some(watcher)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        routes = router.routes().len(),
        "Listening for connections"
    );

    let server = HttpServer::new(config, router);
    server.run(listener, Shutdown::new()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(router: &Router) {
    for (path, controller) in router.routes().iter() {
        let actions = router.actions().action_names(controller.id()).join(", ");
        println!("{path:<12} {:<18} {actions}", controller.name());
    }
}

/// The demo controllers.
///
/// `Site` is the shared base: it assigns the site title and picks the
/// application layout. `Pages` serves `/`, `Posts` serves `/posts`, and
/// `Admin` halts every request without the right token.
fn demo_router(config: &AppConfig) -> Router {
    let site = ControllerType::builder("Site")
        .before(|c: &mut Controller| {
            c.assign("site", "mvc-demo");
            Ok(())
        })
        .default_layout("/application")
        .action("ping", |_: &mut Controller| "pong")
        .build();

    let pages = ControllerType::builder("Pages")
        .extends(&site)
        .action("index", |c: &mut Controller| {
            c.assign("title", "Welcome");
        })
        .action("about", |c: &mut Controller| {
            c.assign("title", "About");
        })
        .build();

    let posts = ControllerType::builder("Posts")
        .extends(&site)
        .default_view(TemplateSelector::dynamic(|action, _params, _request| {
            if action == "draft" {
                "show".to_string()
            } else {
                String::new()
            }
        }))
        .action("index", |c: &mut Controller| {
            c.assign("title", "Posts");
            c.assign("posts", &["first", "second"]);
        })
        .action("show", |c: &mut Controller, id: String| {
            c.assign("title", &format!("Post {id}"));
            c.assign("id", &id);
        })
        .action("draft", |c: &mut Controller, id: String| {
            c.assign("title", &format!("Draft {id}"));
            c.assign("id", &id);
        })
        .action("archive", |c: &mut Controller, parts: Vec<String>| {
            json!({ "route": c.route_path(), "archive": parts })
        })
        .after(|c: &mut Controller| {
            c.set_header(
                axum::http::header::CACHE_CONTROL,
                axum::http::HeaderValue::from_static("no-cache"),
            );
            Ok(())
        })
        .build();

    let admin = ControllerType::builder("Admin")
        .extends(&site)
        .before(|c: &mut Controller| {
            if c.query("token").as_deref() != Some("letmein") {
                c.halt(StatusCode::FORBIDDEN, "Forbidden");
            }
            Ok(())
        })
        .action("index", |_: &mut Controller| "admin")
        .build();

    let mut router = Router::new(config);
    router
        .map("/", &pages)
        .map("/posts", &posts)
        .map("/admin", &admin);
    router
}
