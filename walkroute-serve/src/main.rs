mod api;
mod cli;
mod data;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use walkroute_core::{cache, ingest};
use walkroute_core::EngineState;

use crate::api::ServerState;
use crate::cli::Cli;

/// Mirrors the teacher's two-mode (`text`/`json`) tracing bootstrap.
fn init_tracing(log_format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug"));

    if log_format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
}

/// Builds the graph and spatial index on a background task and publishes
/// them to `engine` once ready (spec §5: requests arriving before build
/// completion see `GraphNotReady`/`SpatialIndexNotReady` rather than
/// blocking). Tries the on-disk cache first; any cache miss or read
/// failure just falls back to a full rebuild from source (spec §6: the
/// cache is a hint, never authoritative), and a successful from-source
/// build is written back to the cache for the next startup.
fn spawn_build(engine: EngineState, data_dir: std::path::PathBuf, cache_path: std::path::PathBuf) {
    tokio::task::spawn_blocking(move || {
        if let Ok((graph, index)) = cache::load(&cache_path) {
            tracing::info!(path = %cache_path.display(), nodes = graph.nodes_count(), "graph loaded from cache");
            engine.publish(graph, index);
            return;
        }

        let layers = match data::load(&data_dir) {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "failed to load data directory; engine will stay not-ready");
                return;
            }
        };
        let (graph, index) = ingest::build(layers.sidewalks, layers.crossings, layers.elevator_paths);
        tracing::info!(nodes = graph.nodes_count(), "graph build complete");

        if let Err(e) = cache::save(&cache_path, &graph) {
            tracing::warn!(error = %e, "failed to write graph cache; will rebuild from source next time");
        }

        engine.publish(graph, index);
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_format);

    let engine = EngineState::new();
    spawn_build(engine.clone(), cli.data_dir.clone(), cli.cache_path());

    let state = Arc::new(ServerState { engine });

    let app = Router::new()
        .route("/v2/route.json", get(api::route_handler))
        .route("/v2/walkshed.json", get(api::walkshed_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", api::ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "walkroute-serve listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
