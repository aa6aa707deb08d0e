//! frontdesk server.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (front controller)
//!                         │
//!                         ▼
//!                     dispatch::Dispatcher ──▶ maintenance gate
//!                         │
//!                         ▼
//!                     resource locator ──▶ factory ──▶ controller method
//!                         │
//!     Client Response     ▼
//!     ◀────────────── status mapped from DispatchOutcome
//! ```

#[path = "../app/mod.rs"]
mod app;

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use frontdesk::config::watcher::ConfigWatcher;
use frontdesk::config::{load_config, FrameworkConfig};
use frontdesk::lifecycle::{signals, Shutdown};
use frontdesk::observability::{logging, metrics};
use frontdesk::{ClassRegistry, Dispatcher, HttpServer};

#[derive(Parser)]
#[command(name = "frontdesk")]
#[command(about = "MVC front controller server", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_exists = args.config.is_file();
    let config = if config_exists {
        load_config(&args.config)?
    } else {
        FrameworkConfig::default()
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "frontdesk starting");
    if !config_exists {
        tracing::warn!(path = %args.config.display(), "Config file not found, using defaults");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        app_dir = %config.app.app_dir.display(),
        maintenance = config.maintenance.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut registry = ClassRegistry::new(config.namespaces.clone());
    app::register(&mut registry)?;
    let dispatcher = Dispatcher::from_config(config.clone(), registry);

    let mut server = HttpServer::new(config.clone(), dispatcher);

    // Dropping the watcher stops it.
    let _watcher = if config_exists {
        let (watcher, updates) = ConfigWatcher::new(&args.config);
        match watcher.run() {
            Ok(watcher) => {
                server = server.with_config_updates(updates);
                Some(watcher)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                None
            }
        }
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
