//! HTTP surface of the recipe backend.
//!
//! `build_router` wires every route onto shared [`AppState`]; `serve` binds
//! a listener and runs until Ctrl+C or SIGTERM.

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use log::{error, info};
use recipe_core::AttributeKind;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod serializers;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    let origins = if state.cors_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(state.cors_origins.clone())
    };
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let recipe_api = routes::recipe::router()
        .merge(routes::attribute::router(AttributeKind::Tag))
        .merge(routes::attribute::router(AttributeKind::Ingredient))
        .merge(routes::banner::router());

    let media = ServeDir::new(state.media.root());

    Router::new()
        .route("/api/health-check/", get(routes::health::health_check))
        .nest("/api/user", routes::user::router())
        .nest("/api/recipe", recipe_api)
        .nest_service(&state.media_url, media)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Serves the router on `addr` until a shutdown signal arrives.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("event=server_start module=api status=ok addr={addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("event=signal_install module=api status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
        info!("event=shutdown module=api status=start signal=ctrl_c");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown module=api status=start signal=terminate");
            }
            Err(err) => {
                error!(
                    "event=signal_install module=api status=error signal=terminate error={err}"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
