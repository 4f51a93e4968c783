//! Test harness with testcontainers for Postgres integration testing.
//!
//! One container is started for the whole test binary. Every harness gets its
//! own freshly migrated database inside it, so tests can run in parallel.

use anyhow::{Context, Result};
use civic_core::kernel::{load_seed, CivicSeed, ServerDeps};
use sqlx::PgPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    server_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --ignored --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;

        Ok(Self {
            server_url: format!("postgresql://postgres:postgres@{}:{}", pg_host, pg_port),
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// A migrated, empty database private to one test.
pub struct TestHarness {
    pub db_pool: PgPool,
    pub database: String,
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;
        let database = format!("civic_test_{}", Uuid::new_v4().simple());

        let admin = PgPool::connect(&format!("{}/postgres", infra.server_url))
            .await
            .context("Failed to connect to admin database")?;
        sqlx::query(&format!("CREATE DATABASE {}", database))
            .execute(&admin)
            .await
            .context("Failed to create test database")?;
        admin.close().await;

        let db_pool = PgPool::connect(&format!("{}/{}", infra.server_url, database))
            .await
            .context("Failed to connect to test database")?;

        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self { db_pool, database })
    }

    /// Fresh database loaded with `seed`, plus Postgres-backed deps over it.
    pub async fn seeded(seed: CivicSeed) -> Result<(Self, ServerDeps)> {
        let harness = Self::new().await?;
        load_seed(&harness.db_pool, &seed).await?;
        let deps = ServerDeps::postgres(harness.db_pool.clone(), seed);
        Ok((harness, deps))
    }
}
