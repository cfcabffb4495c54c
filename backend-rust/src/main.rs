mod clock;
mod config;
mod handlers;
mod persistence;
mod state;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use serde_json::{json, Value};
use socketioxide::extract::SocketRef;
use socketioxide::SocketIo;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use volley_core::{MatchSession, MatchState, UuidIds};

use clock::run_match_clock;
use config::{Args, Settings};
use handlers::{on_connect, AppContext};
use persistence::{PersistHandle, Store};
use state::MatchView;

// ─── HTTP Endpoints ───────────────────────────────────────────────────────────

async fn current_state(State(ctx): State<AppContext>) -> Json<MatchView> {
    Json(ctx.view().await)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ─── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "volleyscore_backend=info,volley_core=info,socketioxide=warn".into()
            }),
        )
        .init();

    info!("🏐 VolleyScore Pro Backend starting...");

    let args = Args::parse();
    let settings = Settings::load(&args).await?;
    info!(
        "Rules: best of {}, sets to {}, tie-break {} ({:?} deuce)",
        settings.match_config.max_sets,
        settings.match_config.points_per_set,
        if settings.match_config.has_tie_break {
            settings.match_config.tie_break_points.to_string()
        } else {
            "off".to_string()
        },
        settings.match_config.deuce_type
    );

    // Load persisted match
    let store = Store::new(&settings.data_dir);
    let fresh = MatchSession::new(
        MatchState::with_config(settings.match_config),
        Box::new(UuidIds),
    );
    let session = match store.load_state().await {
        Some(saved) => fresh.resume(saved),
        None => fresh,
    };
    let (persist, _writer) = PersistHandle::spawn(store);

    // Build Socket.IO layer
    let (socket_layer, io) = SocketIo::builder().build_layer();
    let (ctx, armed) = AppContext::new(session, io.clone(), persist);

    let ctx_sock = ctx.clone();
    io.ns("/", move |socket: SocketRef| {
        let ctx = ctx_sock.clone();
        async move {
            on_connect(socket, ctx).await;
        }
    });

    // Start match clock
    tokio::spawn(run_match_clock(ctx.clone(), armed));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/state", get(current_state))
        .route("/health", get(health))
        .with_state(ctx)
        .layer(socket_layer)
        .layer(cors);

    let addr = format!("0.0.0.0:{}", settings.port);
    info!("🚀 Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
