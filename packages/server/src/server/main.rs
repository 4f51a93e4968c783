// Main entry point for API server

use anyhow::{Context, Result};
use civic_core::kernel::{seed_if_empty, ServerDeps};
use civic_core::server::{build_app, RateLimit};
use civic_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,civic_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Flint Spark Civic API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    let seed = config.load_seed()?;
    tracing::info!("Configuration loaded");

    let server_deps = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connected");

            if config.run_migrations {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run migrations")?;
                tracing::info!("Migrations complete");
            }

            if seed_if_empty(&pool, &seed)
                .await
                .context("Failed to seed empty database")?
            {
                tracing::info!("Empty database seeded");
            }

            ServerDeps::postgres(pool, seed)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory store");
            ServerDeps::in_memory(seed).context("Failed to build in-memory store")?
        }
    };

    // Build application
    let app = build_app(
        server_deps,
        config.allowed_origins.clone(),
        Some(RateLimit {
            per_second: config.rate_limit_per_second,
            burst_size: config.rate_limit_burst,
            trust_forwarded_headers: config.rate_limit_trust_proxy,
        }),
    );

    // Start server
    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
