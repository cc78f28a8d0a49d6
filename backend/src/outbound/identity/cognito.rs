//! Reqwest-backed adapter for the Cognito user pool JSON API.
//!
//! `SignUp` and `InitiateAuth` are public client operations, so requests are
//! plain JSON POSTs with an `X-Amz-Target` header and need no AWS signing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{AuthTokens, IdentityProvider, IdentityProviderError, SignUpRequest};

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Identity provider adapter for one user pool app client.
pub struct CognitoIdentityProvider {
    client: Client,
    endpoint: Url,
    client_id: String,
}

impl CognitoIdentityProvider {
    /// Build an adapter for the regional endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the region does not form a valid URL or the
    /// reqwest client cannot be constructed.
    pub fn new(
        region: &str,
        client_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityProviderError> {
        let endpoint = Url::parse(&format!("https://cognito-idp.{region}.amazonaws.com/"))
            .map_err(|err| IdentityProviderError::unavailable(err.to_string()))?;
        Self::with_endpoint(endpoint, client_id, timeout)
    }

    /// Build an adapter against an explicit endpoint, e.g. a local emulator.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_endpoint(
        endpoint: Url,
        client_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| IdentityProviderError::unavailable(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            client_id: client_id.into(),
        })
    }

    async fn call<B: Serialize + Sync>(
        &self,
        operation: &str,
        body: &B,
    ) -> Result<Vec<u8>, IdentityProviderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        Ok(bytes.to_vec())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpBody<'a> {
    client_id: &'a str,
    username: &'a str,
    password: &'a str,
    user_attributes: [UserAttribute<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UserAttribute<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthBody<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct AuthParameters<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), IdentityProviderError> {
        let body = SignUpBody {
            client_id: &self.client_id,
            username: &request.username,
            password: request.password.as_str(),
            user_attributes: [UserAttribute {
                name: "email",
                value: request.email.as_ref(),
            }],
        };
        self.call("SignUp", &body).await?;
        debug!(username = %request.username, "identity provider accepted sign up");
        Ok(())
    }

    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthTokens, IdentityProviderError> {
        let body = InitiateAuthBody {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id: &self.client_id,
            auth_parameters: AuthParameters { username, password },
        };
        let bytes = self.call("InitiateAuth", &body).await?;
        parse_auth_response(&bytes)
    }
}

fn parse_auth_response(body: &[u8]) -> Result<AuthTokens, IdentityProviderError> {
    let decoded: InitiateAuthResponse = serde_json::from_slice(body)
        .map_err(|err| IdentityProviderError::invalid_response(err.to_string()))?;
    match decoded {
        InitiateAuthResponse {
            authentication_result: Some(result),
            ..
        } => Ok(AuthTokens {
            access_token: result.access_token,
            id_token: result.id_token,
        }),
        InitiateAuthResponse {
            challenge_name: Some(challenge),
            ..
        } => Err(IdentityProviderError::rejected(format!(
            "additional challenge required: {challenge}"
        ))),
        _ => Err(IdentityProviderError::invalid_response(
            "response carried neither tokens nor a challenge",
        )),
    }
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();
    let (kind, message) = parsed
        .map(|err| (err.kind, err.message))
        .unwrap_or((None, None));
    let kind = kind
        .as_deref()
        .map(|raw| raw.rsplit('#').next().unwrap_or(raw).to_owned());
    let detail = match (kind.as_deref(), message) {
        (Some(kind), Some(message)) => format!("{kind}: {message}"),
        (Some(kind), None) => kind.to_owned(),
        (None, Some(message)) => message,
        (None, None) => format!("status {}", status.as_u16()),
    };

    let throttled = kind.as_deref() == Some("TooManyRequestsException");
    if status.is_client_error() && !throttled && status != StatusCode::TOO_MANY_REQUESTS {
        IdentityProviderError::rejected(detail)
    } else {
        IdentityProviderError::unavailable(detail)
    }
}
