//! CLI for preparing and inspecting the civic database
//!
//! Every command prints one JSON object on stdout so it can be scripted.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use civic_core::config::Config;
use civic_core::domains::engagement::{CompletionEvent, EmailSignup, ReadinessStats};
use civic_core::domains::issues::FrequencyExport;
use civic_core::kernel::{
    load_seed, seed_if_empty, table_counts, BaseCivicStore, BaseEngagementLog, CivicSeed,
    PostgresCivicStore, PostgresEngagementLog, SeedSummary, TableCounts,
};

#[derive(Parser)]
#[command(name = "seed_cli")]
#[command(about = "Civic database CLI: migrations, seeding and exports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Replace civic entities with a seed dataset
    Seed {
        /// Seed JSON file (defaults to SEED_FILE, then the bundled dataset)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Only seed when the issues table is empty
        #[arg(long)]
        if_empty: bool,
    },

    /// Print row counts per table
    Verify,

    /// Restore seed counts and clear participant tracking
    Reset,

    /// Print current issue frequencies with a timestamp
    ExportFrequencies,

    /// Print recorded completions, email signups and readiness counts
    ExportEngagement {
        #[arg(long)]
        limit: Option<usize>,
        /// Only signups from this source screen
        #[arg(long)]
        source: Option<String>,
    },
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seeded: Option<SeedSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    counts: Option<TableCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequencies: Option<FrequencyExport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    engagement: Option<EngagementExport>,
}

impl Response {
    fn ok() -> Self {
        Self {
            success: true,
            message: None,
            seeded: None,
            counts: None,
            frequencies: None,
            engagement: None,
        }
    }

    fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Serialize)]
struct EngagementExport {
    completions: Vec<CompletionEvent>,
    email_signups: Vec<EmailSignup>,
    readiness: ReadinessStats,
}

fn output(resp: &Response) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string(resp).context("Failed to serialize response")?
    );
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Migrate => cmd_migrate(&config).await,
        Commands::Seed { file, if_empty } => cmd_seed(&config, file, if_empty).await,
        Commands::Verify => cmd_verify(&config).await,
        Commands::Reset => cmd_reset(&config).await,
        Commands::ExportFrequencies => cmd_export_frequencies(&config).await,
        Commands::ExportEngagement { limit, source } => {
            cmd_export_engagement(&config, limit, source).await
        }
    }
}

async fn get_pool(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set")?;
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_migrate(config: &Config) -> Result<()> {
    let pool = get_pool(config).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    output(&Response::ok().message("Migrations complete"))
}

async fn cmd_seed(config: &Config, file: Option<PathBuf>, if_empty: bool) -> Result<()> {
    let seed = match file {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file {}", path.display()))?;
            CivicSeed::from_json(&raw).context("Failed to parse seed data")?
        }
        None => config.load_seed()?,
    };
    let pool = get_pool(config).await?;

    if if_empty {
        let loaded = seed_if_empty(&pool, &seed).await?;
        let message = if loaded {
            "Seed data loaded"
        } else {
            "Issues table already populated, nothing loaded"
        };
        return output(&Response::ok().message(message));
    }

    let summary = load_seed(&pool, &seed).await?;
    output(&Response {
        seeded: Some(summary),
        ..Response::ok()
    })
}

async fn cmd_verify(config: &Config) -> Result<()> {
    let pool = get_pool(config).await?;
    let counts = table_counts(&pool).await?;
    output(&Response {
        counts: Some(counts),
        ..Response::ok()
    })
}

async fn cmd_reset(config: &Config) -> Result<()> {
    let pool = get_pool(config).await?;
    let store = PostgresCivicStore::new(pool, config.load_seed()?);
    store.reset().await?;
    output(&Response::ok().message("All issue counts have been reset to demo values"))
}

async fn cmd_export_frequencies(config: &Config) -> Result<()> {
    let pool = get_pool(config).await?;
    let store = PostgresCivicStore::new(pool, config.load_seed()?);
    let frequencies = store.export().await?;
    output(&Response {
        frequencies: Some(frequencies),
        ..Response::ok()
    })
}

async fn cmd_export_engagement(
    config: &Config,
    limit: Option<usize>,
    source: Option<String>,
) -> Result<()> {
    let pool = get_pool(config).await?;
    let log = PostgresEngagementLog::new(pool);

    let engagement = EngagementExport {
        completions: log.list_completions(limit).await?,
        email_signups: log.list_email_signups(limit, source.as_deref()).await?,
        readiness: log.readiness_stats().await?,
    };
    output(&Response {
        engagement: Some(engagement),
        ..Response::ok()
    })
}
