/*
 * Responsibility
 * - tracing 初期化 → Config 読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (gate / role gate / CORS / HTTP 層)
 * - axum::serve() で起動
 */
use std::panic;

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::auth::build_auth_service;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,auth_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched.
        tracing::error!(%info, "panic");
        // The request itself is answered with 500 by the catch-panic layer.
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    init_panic_hook();

    let config = Config::from_env()?;

    tracing::info!(
        "starting auth gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    // The verification secret is injected here; nothing below reads the environment.
    let auth = build_auth_service(config)?;
    Ok(AppState::new(auth, config))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
