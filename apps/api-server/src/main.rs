//! # Folio API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use folio_core::ports::TokenService;
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::request_id::RequestIdMiddleware;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Folio API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await;
    let token_service = token_service(&config);

    HttpServer::new(move || {
        let app = App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()));

        let app = match &token_service {
            Some(tokens) => app.app_data(web::Data::new(tokens.clone())),
            None => app,
        };

        app.configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(feature = "auth")]
fn token_service(config: &AppConfig) -> Option<Arc<dyn TokenService>> {
    use folio_infra::{JwtConfig, JwtTokenService};

    let defaults = JwtConfig::default();
    let jwt = JwtConfig {
        secret: config.jwt.secret.clone().unwrap_or(defaults.secret),
        expiration_hours: config.jwt.expiration_hours,
        issuer: config.jwt.issuer.clone(),
    };
    Some(Arc::new(JwtTokenService::new(jwt)))
}

#[cfg(not(feature = "auth"))]
fn token_service(_config: &AppConfig) -> Option<Arc<dyn TokenService>> {
    tracing::warn!("auth feature disabled - every authoring request will be rejected");
    None
}
