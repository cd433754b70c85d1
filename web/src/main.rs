use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    response::{IntoResponse, Redirect},
    routing::get,
};
use clap::Parser;
use config::EnvConfig;
use libgeoloc::Database;
use logging::Logger;
use state::{AppState, SharedState};
use std::{path::PathBuf, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};

mod api;
mod config;
mod error;
mod logging;
mod state;

const API_PREFIX: &str = "/api";

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The environment section of the configuration file to use
    #[arg(short, long, default_value = "dev")]
    pub env: String,
    /// Path to the yaml configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let env = EnvConfig::load(&config_path, &args.env)?;
    let log = Logger::init(env!("CARGO_PKG_NAME"), &env.log)?;
    debug!(?config_path, envname = %args.env, "loaded configuration");

    debug!("using database '{}'", env.database);
    let db = Database::open(&env.database)
        .await
        .with_context(|| format!("Unable to open database {}", &env.database))?;

    let shared_state = Arc::new(SharedState::new(Arc::new(db.clone()), log.clone()));
    let app = app(shared_state, &env.cors_origins)?;

    let addr = format!("{}:{}", env.listen.host, env.listen.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Unable to listen on {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    log.shutdown();
    Ok(())
}

fn app(state: AppState, cors_origins: &[String]) -> Result<Router> {
    let mut app = Router::new()
        .route("/", get(root))
        .nest(API_PREFIX, api::router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        );
    if let Some(cors) = cors_layer(cors_origins)? {
        app = app.layer(cors);
    }
    Ok(app)
}

fn cors_layer(origins: &[String]) -> Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);
    // credentials can't be combined with a wildcard origin
    if origins.iter().any(|o| o == "*") {
        return Ok(Some(layer.allow_origin(AllowOrigin::any())));
    }
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true),
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => _ = sig.recv().await,
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

async fn root() -> impl IntoResponse {
    Redirect::permanent("/api/locations/")
}

#[cfg(test)]
async fn test_app(pool: sqlx::Pool<sqlx::Sqlite>) -> Result<Router> {
    test_app_with_cors(pool, &[]).await
}

#[cfg(test)]
async fn test_app_with_cors(pool: sqlx::Pool<sqlx::Sqlite>, origins: &[String]) -> Result<Router> {
    let state = Arc::new(SharedState::test(pool));
    app(state, origins)
}
