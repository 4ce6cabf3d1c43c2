use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use pfadfinder::discovery::{discover, CatalogLoader, DiscoveryOptions, TracingReporter};
use pfadfinder::{app, config, metrics::Metrics, state::AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;

const CRATE_DIR: &str = env!("CARGO_MANIFEST_DIR");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (embedded defaults -> pfadfinder.toml -> env/.env)
    let app_cfg = config::load()?;

    // Logging (stdout + tägliche Datei-Rotation)
    std::fs::create_dir_all(&app_cfg.logging.dir).ok();
    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let file_appender = tracing_appender::rolling::daily(&app_cfg.logging.dir, &app_cfg.logging.file_name);
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| app_cfg.logging.filter.clone().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Guards am Leben halten, damit Non-Blocking Writer korrekt flushen
    let _log_guards = (stdout_guard, file_guard);

    // Route discovery must finish before the listener is bound.
    let mut options = DiscoveryOptions::from_config(&app_cfg.routes).with_reserved(app::BUILTIN_ROUTES);
    options.root = resolve_routes_dir(&options.root);
    info!("Discovering routes under {}", options.root.display());
    let catalog = api::catalog();
    let output = tokio::task::spawn_blocking(move || {
        discover(&options, &CatalogLoader::new(&catalog), &mut TracingReporter)
    })
    .await??;

    let metrics = Metrics::new();
    metrics.record_discovery(&output.summary);
    let registry = output.registry;
    let state = AppState::new(app_cfg.clone(), metrics, registry.describe());
    let app = app::build_app(state, registry);

    // Server listen addr (from config)
    let port: u16 = app_cfg.server.port;
    let host: String = app_cfg.server.host.clone();
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen addr {}:{} - {}", host, port, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Pfadfinder listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// Uses the configured directory; a relative one that does not exist falls
/// back to the tree shipped with the crate.
fn resolve_routes_dir(configured: &Path) -> PathBuf {
    if configured.is_relative() && !configured.is_dir() {
        let shipped = Path::new(CRATE_DIR).join(configured);
        if shipped.is_dir() {
            return shipped;
        }
    }
    configured.to_path_buf()
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received. Stopping server...");
}
