//! Centralized application configuration.
//! Combines environment variables and CLI arguments.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, str::FromStr};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub seed_buckets: Vec<SeedBucket>,
}

/// A bucket created at startup so tests can address it immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedBucket {
    pub name: String,
    pub versioning_enabled: bool,
}

impl FromStr for SeedBucket {
    type Err = anyhow::Error;

    /// Accepts `name` or `name:versioned`.
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            None => Ok(Self {
                name: s.to_string(),
                versioning_enabled: false,
            }),
            Some((name, "versioned")) => Ok(Self {
                name: name.to_string(),
                versioning_enabled: true,
            }),
            Some((_, mode)) => bail!("unknown seed bucket mode `{mode}` (expected `versioned`)"),
        }
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Fake Cloud Storage server for client testing")]
pub struct Args {
    /// Host to bind to (overrides FAKE_GCS_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides FAKE_GCS_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bucket to create at startup as `name` or `name:versioned`;
    /// repeatable (overrides FAKE_GCS_SEED_BUCKETS)
    #[arg(long = "seed-bucket")]
    pub seed_buckets: Vec<SeedBucket>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into an AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();
        Self::merge(args)
    }

    fn merge(args: Args) -> Result<Self> {
        let env_host = env::var("FAKE_GCS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("FAKE_GCS_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing FAKE_GCS_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 4443,
            Err(err) => return Err(err).context("reading FAKE_GCS_PORT"),
        };
        let env_seeds = match env::var("FAKE_GCS_SEED_BUCKETS") {
            Ok(value) => value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(SeedBucket::from_str)
                .collect::<Result<Vec<_>>>()
                .context("parsing FAKE_GCS_SEED_BUCKETS")?,
            Err(_) => Vec::new(),
        };

        let seed_buckets = if args.seed_buckets.is_empty() {
            env_seeds
        } else {
            args.seed_buckets
        };

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            seed_buckets,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_bucket_without_mode_is_unversioned() {
        let seed: SeedBucket = "pics".parse().unwrap();
        assert_eq!(seed.name, "pics");
        assert!(!seed.versioning_enabled);
    }

    #[test]
    fn seed_bucket_versioned_mode() {
        let seed: SeedBucket = "archive:versioned".parse().unwrap();
        assert_eq!(seed.name, "archive");
        assert!(seed.versioning_enabled);
    }

    #[test]
    fn seed_bucket_rejects_unknown_mode() {
        assert!("b:frozen".parse::<SeedBucket>().is_err());
    }
}
