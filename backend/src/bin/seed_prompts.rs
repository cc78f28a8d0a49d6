//! Insert the built-in ADMIN prompts into PostgreSQL.
//!
//! Seeding is skipped when ADMIN prompts already exist, so the command is
//! safe to rerun after deployments.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use promptdeck::domain::{SeedOutcome, seed_admin_prompts};
use promptdeck::outbound::persistence::{
    DbPool, DieselPromptRepository, PoolConfig, run_pending_migrations,
};

/// `seed-prompts` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-prompts",
    about = "Seed the ADMIN conversation prompts into the record store",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `PROMPTS_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url", env = "PROMPTS_DATABASE_URL")]
    database_url: Option<String>,
    /// Apply pending migrations before seeding.
    #[arg(long = "migrate")]
    migrate: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = CliArgs::parse();
    let url = args
        .database_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| eyre!("a database URL is required (--database-url or PROMPTS_DATABASE_URL)"))?;

    if args.migrate {
        run_pending_migrations(&url)
            .await
            .wrap_err("failed to apply migrations")?;
    }
    let pool = DbPool::new(PoolConfig::new(url.as_str()).with_max_size(1))
        .await
        .wrap_err("failed to connect to the database")?;
    let repo = DieselPromptRepository::new(pool);

    match seed_admin_prompts(&repo, &DefaultClock)
        .await
        .wrap_err("failed to seed ADMIN prompts")?
    {
        SeedOutcome::Seeded { count } => info!(count, "seeded ADMIN prompts"),
        SeedOutcome::AlreadySeeded { existing } => {
            info!(existing, "ADMIN prompts already present; nothing to do");
        }
    }
    Ok(())
}
