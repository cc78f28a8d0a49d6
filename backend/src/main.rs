//! Service entry-point: loads settings, selects the record store and identity
//! adapters, then serves the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use promptdeck::domain::{ReadRetryPolicy, SeedOutcome, seed_admin_prompts};
use promptdeck::inbound::http::health::HealthState;
use promptdeck::inbound::http::session_config::{BuildMode, session_settings_from_env};
use promptdeck::outbound::identity::{
    CognitoIdentityProvider, HttpKeySetSource, JwtIdentityVerifier, TokenExpectations,
};
use promptdeck::outbound::memory::MemoryPromptStore;
use promptdeck::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use promptdeck::settings::AppSettings;
use server::{RecordStore, ServerConfig, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load PROMPTS_* settings")?;
    let env = DefaultEnv::new();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .wrap_err("invalid session cookie configuration")?;
    info!(fingerprint = %session.fingerprint, "session key loaded");

    let store = record_store(&settings).await?;
    if settings.seed_prompts {
        match seed_admin_prompts(store.prompts().as_ref(), &DefaultClock)
            .await
            .wrap_err("failed to seed ADMIN prompts")?
        {
            SeedOutcome::Seeded { count } => info!(count, "ADMIN prompts seeded"),
            SeedOutcome::AlreadySeeded { existing } => {
                info!(existing, "ADMIN prompts already present");
            }
        }
    }

    let identity = settings.identity()?;
    let expectations = TokenExpectations::cognito(
        &identity.region,
        &identity.user_pool_id,
        &identity.client_id,
    );
    let jwks_url = identity
        .jwks_url
        .clone()
        .unwrap_or_else(|| expectations.jwks_url());
    let key_source = HttpKeySetSource::new(
        Url::parse(&jwks_url).wrap_err_with(|| format!("invalid JWKS URL {jwks_url}"))?,
        settings.http_timeout(),
    )
    .wrap_err("failed to build JWKS client")?;
    let verifier =
        JwtIdentityVerifier::new(key_source, expectations, settings.jwks_refresh_interval());
    let provider = CognitoIdentityProvider::new(
        &identity.region,
        identity.client_id.clone(),
        settings.http_timeout(),
    )
    .wrap_err("failed to build identity provider client")?;

    let retry = ReadRetryPolicy::default().with_max_attempts(settings.retry_attempts()?);
    let http_state = build_http_state(&store, Arc::new(provider), Arc::new(verifier), retry);

    let bind_addr = settings.bind_addr()?;
    let config = ServerConfig::new(session, bind_addr, http_state);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::build_prometheus()?));

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting HTTP server");
    create_server(health_state, config)?.await?;
    Ok(())
}

async fn record_store(settings: &AppSettings) -> Result<RecordStore> {
    let Some(url) = settings.database_url() else {
        warn!("PROMPTS_DATABASE_URL not set; using the in-memory record store (dev only)");
        return Ok(RecordStore::Memory(Arc::new(MemoryPromptStore::default())));
    };

    if settings.run_migrations {
        run_pending_migrations(url)
            .await
            .wrap_err("failed to apply migrations")?;
    }
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
        .await
        .wrap_err("failed to build database pool")?;
    Ok(RecordStore::Postgres(pool))
}
