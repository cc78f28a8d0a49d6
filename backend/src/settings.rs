//! Application settings loaded via OrthoConfig.
//!
//! Every value can be supplied as a `PROMPTS_*` environment variable, a CLI
//! flag, or a configuration file key. Optional values fall back to the
//! defaults exposed by the accessor methods.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
const DEFAULT_JWKS_REFRESH_SECS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("missing required setting PROMPTS_{name}")]
    Missing { name: &'static str },
    #[error("PROMPTS_RETRY_ATTEMPTS must be at least 1")]
    NoRetryAttempts,
}

/// Identity provider coordinates for one user pool app client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySettings {
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    pub jwks_url: Option<String>,
}

/// Runtime configuration for the prompt service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PROMPTS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    pub identity_region: Option<String>,
    pub user_pool_id: Option<String>,
    pub client_id: Option<String>,
    /// Overrides the key set location derived from the issuer.
    pub jwks_url: Option<String>,
    /// Timeout for identity provider and key set requests, in seconds.
    pub http_timeout_secs: Option<u64>,
    /// Minimum gap between key set refreshes for unknown key ids, in seconds.
    pub jwks_refresh_secs: Option<u64>,
    /// Attempts for retryable record store reads.
    pub retry_attempts: Option<u32>,
    /// Apply pending SQL migrations at startup.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
    /// Insert the built-in ADMIN prompts at startup when none exist.
    #[ortho_config(default = false)]
    pub seed_prompts: bool,
}

impl AppSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not
    /// parse as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    pub fn jwks_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.jwks_refresh_secs.unwrap_or(DEFAULT_JWKS_REFRESH_SECS))
    }

    /// Read retry attempts; zero is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NoRetryAttempts`] for a configured value of 0.
    pub fn retry_attempts(&self) -> Result<u32, SettingsError> {
        match self.retry_attempts {
            Some(0) => Err(SettingsError::NoRetryAttempts),
            Some(attempts) => Ok(attempts),
            None => Ok(DEFAULT_RETRY_ATTEMPTS),
        }
    }

    /// Identity provider coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] naming the first absent value.
    pub fn identity(&self) -> Result<IdentitySettings, SettingsError> {
        Ok(IdentitySettings {
            region: required(&self.identity_region, "IDENTITY_REGION")?,
            user_pool_id: required(&self.user_pool_id, "USER_POOL_ID")?,
            client_id: required(&self.client_id, "CLIENT_ID")?,
            jwks_url: self.jwks_url.clone().filter(|url| !url.trim().is_empty()),
        })
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, SettingsError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or(SettingsError::Missing { name })
}

#[cfg(test)]
mod tests {
    //! Unit tests for application settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 12] = [
        "PROMPTS_BIND_ADDR",
        "PROMPTS_DATABASE_URL",
        "PROMPTS_POOL_MAX_SIZE",
        "PROMPTS_IDENTITY_REGION",
        "PROMPTS_USER_POOL_ID",
        "PROMPTS_CLIENT_ID",
        "PROMPTS_JWKS_URL",
        "PROMPTS_HTTP_TIMEOUT_SECS",
        "PROMPTS_JWKS_REFRESH_SECS",
        "PROMPTS_RETRY_ATTEMPTS",
        "PROMPTS_RUN_MIGRATIONS",
        "PROMPTS_SEED_PROMPTS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("promptdeck")]).expect("config should load")
    }

    fn cleared_with(overrides: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(cleared_with(&[]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.http_timeout(), Duration::from_secs(5));
        assert_eq!(settings.jwks_refresh_interval(), Duration::from_secs(30));
        assert_eq!(settings.retry_attempts().expect("default attempts"), 3);
        assert!(!settings.run_migrations);
        assert!(!settings.seed_prompts);
        assert!(matches!(
            settings.identity(),
            Err(SettingsError::Missing {
                name: "IDENTITY_REGION"
            })
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_with(&[
            ("PROMPTS_BIND_ADDR", "127.0.0.1:9000"),
            ("PROMPTS_DATABASE_URL", "postgres://localhost/prompts"),
            ("PROMPTS_IDENTITY_REGION", "eu-west-1"),
            ("PROMPTS_USER_POOL_ID", "eu-west-1_pool"),
            ("PROMPTS_CLIENT_ID", "client"),
            ("PROMPTS_HTTP_TIMEOUT_SECS", "2"),
            ("PROMPTS_RETRY_ATTEMPTS", "5"),
            ("PROMPTS_SEED_PROMPTS", "true"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("address"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.database_url(), Some("postgres://localhost/prompts"));
        assert_eq!(settings.http_timeout(), Duration::from_secs(2));
        assert_eq!(settings.retry_attempts().expect("attempts"), 5);
        assert!(settings.seed_prompts);
        let identity = settings.identity().expect("identity settings");
        assert_eq!(identity.region, "eu-west-1");
        assert_eq!(identity.client_id, "client");
        assert!(identity.jwks_url.is_none());
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let _guard = lock_env(cleared_with(&[("PROMPTS_DATABASE_URL", "  ")]));

        assert!(load_from_empty_args().database_url().is_none());
    }

    #[rstest]
    #[case::bad_addr("PROMPTS_BIND_ADDR", "not-an-address")]
    #[case::zero_retries("PROMPTS_RETRY_ATTEMPTS", "0")]
    fn invalid_values_are_reported(#[case] name: &'static str, #[case] value: &str) {
        let _guard = lock_env(cleared_with(&[(name, value)]));

        let settings = load_from_empty_args();

        let failed = settings.bind_addr().is_err() || settings.retry_attempts().is_err();
        assert!(failed, "{name}={value} should be rejected");
    }
}
