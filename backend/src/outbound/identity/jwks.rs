//! RS256 bearer token verification against a JSON Web Key Set.
//!
//! Keys are cached behind an async `RwLock`. A token naming an unknown key id
//! triggers a refetch, rate limited by the configured minimum interval so a
//! stream of forged key ids cannot hammer the provider.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::ports::{IdentityVerifier, IdentityVerifierError};
use crate::domain::{Email, UserId, VerifiedIdentity};

/// Supplies the provider's current key set.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, IdentityVerifierError>;
}

/// Fetches the key set from an HTTPS endpoint.
pub struct HttpKeySetSource {
    client: Client,
    url: Url,
}

impl HttpKeySetSource {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn fetch(&self) -> Result<JwkSet, IdentityVerifierError> {
        let unavailable =
            |err: reqwest::Error| IdentityVerifierError::key_set_unavailable(err.to_string());
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;
        response.json::<JwkSet>().await.map_err(unavailable)
    }
}

/// Serves a fixed key set; used by tests and air-gapped deployments.
#[derive(Clone)]
pub struct StaticKeySetSource {
    keys: JwkSet,
}

impl StaticKeySetSource {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }

    /// Parse a JWKS JSON document.
    ///
    /// # Errors
    ///
    /// Returns `KeySetUnavailable` when the document is not a valid key set.
    pub fn from_json(raw: &str) -> Result<Self, IdentityVerifierError> {
        serde_json::from_str(raw)
            .map(Self::new)
            .map_err(|err| IdentityVerifierError::key_set_unavailable(err.to_string()))
    }
}

#[async_trait]
impl KeySetSource for StaticKeySetSource {
    async fn fetch(&self) -> Result<JwkSet, IdentityVerifierError> {
        Ok(self.keys.clone())
    }
}

/// Issuer and audience a token must carry.
#[derive(Debug, Clone)]
pub struct TokenExpectations {
    pub issuer: String,
    pub audience: String,
}

impl TokenExpectations {
    /// Expectations for a Cognito user pool ID token.
    ///
    /// # Examples
    /// ```
    /// use promptdeck::outbound::identity::TokenExpectations;
    ///
    /// let expected = TokenExpectations::cognito("eu-west-1", "eu-west-1_abc", "client");
    /// assert_eq!(
    ///     expected.issuer,
    ///     "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_abc"
    /// );
    /// ```
    pub fn cognito(region: &str, user_pool_id: &str, client_id: &str) -> Self {
        Self {
            issuer: format!("https://cognito-idp.{region}.amazonaws.com/{user_pool_id}"),
            audience: client_id.to_owned(),
        }
    }

    /// Well-known key set location for this issuer.
    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.issuer)
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Default)]
struct CachedKeys {
    keys: Option<JwkSet>,
    fetched_at: Option<Instant>,
}

/// Verifies RS256 tokens with cached provider keys.
pub struct JwtIdentityVerifier<S> {
    source: S,
    expectations: TokenExpectations,
    min_refresh_interval: Duration,
    cache: RwLock<CachedKeys>,
}

impl<S: KeySetSource> JwtIdentityVerifier<S> {
    pub fn new(source: S, expectations: TokenExpectations, min_refresh_interval: Duration) -> Self {
        Self {
            source,
            expectations,
            min_refresh_interval,
            cache: RwLock::new(CachedKeys::default()),
        }
    }

    async fn decoding_key(&self, key_id: &str) -> Result<DecodingKey, IdentityVerifierError> {
        {
            let cache = self.cache.read().await;
            if let Some(jwk) = cache.keys.as_ref().and_then(|keys| keys.find(key_id)) {
                return decoding_key_from(jwk);
            }
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(jwk) = cache.keys.as_ref().and_then(|keys| keys.find(key_id)) {
            return decoding_key_from(jwk);
        }
        let refresh_allowed = cache
            .fetched_at
            .is_none_or(|at| at.elapsed() >= self.min_refresh_interval);
        if !refresh_allowed {
            return Err(IdentityVerifierError::unknown_key(key_id));
        }

        let keys = self.source.fetch().await?;
        info!(keys = keys.keys.len(), "refreshed identity provider signing keys");
        cache.fetched_at = Some(Instant::now());
        let found = keys.find(key_id).map(decoding_key_from);
        cache.keys = Some(keys);
        found.unwrap_or_else(|| Err(IdentityVerifierError::unknown_key(key_id)))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.expectations.issuer.as_str()]);
        validation.set_audience(&[self.expectations.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation
    }
}

fn decoding_key_from(jwk: &jsonwebtoken::jwk::Jwk) -> Result<DecodingKey, IdentityVerifierError> {
    DecodingKey::from_jwk(jwk)
        .map_err(|err| IdentityVerifierError::key_set_unavailable(err.to_string()))
}

fn map_decode_error(error: jsonwebtoken::errors::Error) -> IdentityVerifierError {
    match error.kind() {
        ErrorKind::ExpiredSignature => IdentityVerifierError::expired(),
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => IdentityVerifierError::malformed_token(error.to_string()),
        _ => IdentityVerifierError::invalid_claims(error.to_string()),
    }
}

#[async_trait]
impl<S: KeySetSource> IdentityVerifier for JwtIdentityVerifier<S> {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityVerifierError> {
        let header = decode_header(token).map_err(map_decode_error)?;
        let key_id = header
            .kid
            .ok_or_else(|| IdentityVerifierError::malformed_token("token header has no kid"))?;
        let key = self.decoding_key(&key_id).await?;

        let data = decode::<Claims>(token, &key, &self.validation()).map_err(map_decode_error)?;
        let user_id = UserId::new(data.claims.sub)
            .map_err(|err| IdentityVerifierError::invalid_claims(err.to_string()))?;
        let email = match data.claims.email {
            Some(raw) => match Email::new(raw) {
                Ok(email) => Some(email),
                Err(err) => {
                    debug!(error = %err, "ignoring unusable email claim");
                    None
                }
            },
            None => None,
        };
        Ok(VerifiedIdentity::new(user_id, email))
    }
}
