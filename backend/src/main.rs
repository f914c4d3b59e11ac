use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;

mod clock;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;

use clock::{Clock, SystemClock};
use config::Config;
use services::auth::SessionAuthority;
use services::ledger::RefreshTokenLedger;
use services::tokens::TokenIssuer;
use services::users::UserRepository;

fn startup_error(context: &str, e: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, e);
    io::Error::other(format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    log::info!("Starting server at {}:{}", config.host, config.port);

    let pool = db::create_pool(&config.database)
        .await
        .map_err(|e| startup_error("Failed to create database pool", e))?;

    db::run_migrations(&pool)
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;

    log::info!("Database migrations completed");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let tokens = Arc::new(TokenIssuer::new(&config.jwt, clock.clone()));
    let sessions = SessionAuthority::new(
        UserRepository::new(pool.clone()),
        RefreshTokenLedger::new(pool.clone()),
        tokens.clone(),
        clock,
    );

    let app_state = web::Data::new(models::AppState { db: pool, sessions });
    // The bearer extractor looks the issuer up on its own.
    let token_issuer = web::Data::from(tokens);

    let allowed_origins = config.cors_origins.clone();

    HttpServer::new(move || {
        let allowed_origins = allowed_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origin = origin.to_str().unwrap_or("");
                allowed_origins.iter().any(|allowed| allowed == origin)
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Content-Type"])
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .app_data(token_issuer.clone())
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .wrap(cors)
            .configure(handlers::configure_app)
    })
    .client_request_timeout(config.request_timeout)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
