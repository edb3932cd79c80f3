//! gridboard: persistence endpoints for the customizable dashboard layout.
//!
//! | Module | Role |
//! |--------|------|
//! | `config` | Environment configuration |
//! | `db` | Pool creation and migrations |
//! | `routes` | Axum router, auth extractors, layout handlers |
//! | `services` | Layout validation/storage and session lookup |
//! | `state` | Shared handler state |

mod config;
mod db;
mod routes;
mod services;
mod state;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config = match config::ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let pool = match db::init_pool(&config.database_url, config.db_max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "database init failed");
            return ExitCode::FAILURE;
        }
    };
    let state = state::AppState::new(pool);

    let app = routes::app(state, config.max_body_bytes);
    let port = config.port;
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %port, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%port, max_body_bytes = config.max_body_bytes, "gridboard listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
