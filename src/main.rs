//! Fern reporter server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};
use actix_web::{App, HttpServer, web};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fern_reporter_lib::api;
use fern_reporter_lib::config::Config;
use fern_reporter_lib::db::DbPool;
use fern_reporter_lib::graphql;
use fern_reporter_lib::middleware::{RequestDeadline, RequestLogger};

/// CORS preflight cache lifetime.
const CORS_MAX_AGE_SECS: usize = 12 * 60 * 60;

/// Container health check: succeeds when the configured database answers.
async fn health_check() -> bool {
    let Ok(config) = Config::from_env() else {
        return false;
    };
    match DbPool::new(&config).await {
        Ok(pool) => pool.ping().await.is_ok(),
        Err(_) => false,
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Check for --health-check flag (used by container HEALTHCHECK)
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        std::process::exit(if health_check().await { 0 } else { 1 });
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL must be set and differ from the development default");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Fern Reporter Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    let schema = graphql::build_schema(pool.clone());
    let bind_address = config.bind_address();
    let request_timeout = config.request_timeout();

    let worker_count = if config.is_development() {
        4
    } else {
        num_cpus::get()
    };
    info!(
        "Starting server at http://{} ({} workers, {}s request deadline)",
        bind_address,
        worker_count,
        request_timeout.as_secs()
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::ORIGIN,
                header::CONTENT_LENGTH,
                header::CONTENT_TYPE,
                HeaderName::from_static("access_token"),
            ])
            .max_age(CORS_MAX_AGE_SECS);

        // Last wrap is outermost: CORS answers preflights before logging and deadlines.
        App::new()
            .wrap(RequestDeadline::new(request_timeout))
            .wrap(RequestLogger)
            .wrap(cors)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(schema.clone()))
            .configure(api::configure_all)
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
