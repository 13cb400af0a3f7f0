use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use blog_backend::auth::policy::AccessPolicy;
use blog_backend::middleware::auth_guard::AuthGuard;
use blog_backend::middleware::cors::cors_middleware;
use blog_backend::middleware::request_trace::RequestTrace;
use blog_backend::middleware::structured_logger::StructuredLogger;
use blog_backend::routes;
use blog_backend::state::app_state::AppState;
use blog_backend::state::security_config::SecurityConfig;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let host = std::env::var("BLOG_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BLOG_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("BLOG_PORT must be a valid port number");
            std::process::exit(1);
        });

    let jwt_secret = match std::env::var("BLOG_JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => secret,
        _ => {
            eprintln!("BLOG_JWT_SECRET must be set");
            std::process::exit(1);
        }
    };
    let security_config = SecurityConfig::new(jwt_secret.as_bytes());

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL must be set");
            std::process::exit(1);
        }
    };

    let mut connect_options = ConnectOptions::new(database_url);
    connect_options
        .max_connections(10)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = match Database::connect(connect_options).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(&db, None).await {
        eprintln!("Failed to run migrations: {e}");
        std::process::exit(1);
    }

    tracing::info!(host = %host, port, "starting blog backend");

    let data = web::Data::new(AppState::new(db, security_config));
    let policy = Arc::new(AccessPolicy::blog_defaults());

    HttpServer::new(move || {
        // Registration order is inside-out: the guard runs closest to
        // the handlers, the trace wrapper outermost.
        App::new()
            .wrap(AuthGuard::new(policy.clone()))
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
