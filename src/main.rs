use std::sync::Arc;

use anyhow::Context;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use cardwall::config::DashboardConfig;
use cardwall::dashboard::{
    AppState, FileSource, Refresher, SnapshotStore, TrackerSource, dashboard_routes,
    spawn_refresh_task,
};
use cardwall::stickers::StickerCatalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::from_env().context("invalid configuration")?;

    // Initialize tracing
    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting cardwall");

    // ── Sticker catalog ─────────────────────────────────────────────────
    let catalog = Arc::new(
        StickerCatalog::load(&config.stickers_path).with_context(|| {
            format!(
                "failed to load stickers from {}",
                config.stickers_path.display()
            )
        })?,
    );
    if catalog.is_empty() {
        tracing::warn!("Sticker catalog is empty, cards will only show blocker stickers");
    } else {
        tracing::info!(stickers = catalog.len(), "Sticker catalog loaded");
    }

    // ── Refresh loop ────────────────────────────────────────────────────
    let store = SnapshotStore::new();
    let source = FileSource::new(&config.export_path);
    tracing::info!(export = %source.path().display(), "Reading tracker export");
    let source: Arc<dyn TrackerSource> = Arc::new(source);

    let refresher = Arc::new(Refresher::new(
        source,
        Arc::clone(&catalog),
        Arc::clone(&store),
    ));
    if let Err(e) = refresher.refresh_once().await {
        tracing::warn!("Initial refresh failed, board starts empty: {e}");
    }
    let (_refresh_handle, _shutdown) = spawn_refresh_task(refresher, config.refresh);

    // ── HTTP ────────────────────────────────────────────────────────────
    let app = dashboard_routes(AppState {
        store,
        catalog,
        limits: config.limits,
        support_kinds: config.support_kinds.into(),
    })
    .layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Dashboard server started");

    axum::serve(listener, app).await?;

    Ok(())
}
