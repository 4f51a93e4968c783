use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

use crate::kernel::CivicSeed;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// When set the Postgres backend is used, otherwise everything stays in memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub allowed_origins: Vec<String>,
    pub run_migrations: bool,
    /// Seed file replacing the bundled dataset
    pub seed_file: Option<PathBuf>,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    /// Key the rate limit on `X-Forwarded-For`, only behind a trusted proxy
    pub rate_limit_trust_proxy: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            allowed_origins: parse_origins(
                &env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:8080,http://127.0.0.1:8080".to_string()),
            ),
            run_migrations: parse_bool(&env::var("RUN_MIGRATIONS").unwrap_or_else(|_| "true".to_string()))
                .context("RUN_MIGRATIONS must be true or false")?,
            seed_file: env::var("SEED_FILE").ok().map(PathBuf::from),
            rate_limit_per_second: env::var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("RATE_LIMIT_PER_SECOND must be a valid number")?,
            rate_limit_burst: env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("RATE_LIMIT_BURST must be a valid number")?,
            rate_limit_trust_proxy: parse_bool(
                &env::var("RATE_LIMIT_TRUST_PROXY").unwrap_or_else(|_| "false".to_string()),
            )
            .context("RATE_LIMIT_TRUST_PROXY must be true or false")?,
        })
    }

    /// The configured seed file, or the bundled dataset
    pub fn load_seed(&self) -> Result<CivicSeed> {
        match &self.seed_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read seed file {}", path.display()))?;
                CivicSeed::from_json(&raw)
                    .with_context(|| format!("Failed to parse seed file {}", path.display()))
            }
            None => CivicSeed::embedded().context("Failed to parse bundled seed data"),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(anyhow::anyhow!("Invalid boolean: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origins_are_trimmed_and_blanks_dropped() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("sometimes").is_err());
    }
}
