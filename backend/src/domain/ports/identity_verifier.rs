//! Port for verifying bearer tokens issued by the identity provider.

use async_trait::async_trait;

use crate::domain::{UserId, VerifiedIdentity};

use super::define_port_error;

define_port_error! {
    /// Reasons a token failed verification.
    ///
    /// Rejections surface to clients as the same `unauthorized` error and the
    /// detail is only logged. An unreachable key set surfaces as
    /// `service_unavailable`.
    pub enum IdentityVerifierError {
        /// Token could not be decoded or carries no key id.
        MalformedToken { message: String } => "malformed token: {message}",
        /// The signing key is absent from the provider's key set.
        UnknownKey { key_id: String } => "no signing key with id {key_id}",
        /// Signature, issuer, audience, or subject checks failed.
        InvalidClaims { message: String } => "token claims rejected: {message}",
        /// Token lifetime has elapsed.
        Expired => "token has expired",
        /// The provider's key set could not be fetched.
        KeySetUnavailable { message: String } => "signing keys unavailable: {message}",
    }
}

/// Verifies a bearer token and returns the identity it asserts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Validate signature and claims of `token`.
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityVerifierError>;
}

/// Fixture verifier that treats the token text as the subject.
///
/// Tokens of the form `sub` or `sub|email` are accepted; the literal
/// `expired` is rejected. Intended for tests and local runs without an
/// identity provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityVerifier;

#[async_trait]
impl IdentityVerifier for FixtureIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityVerifierError> {
        if token == "expired" {
            return Err(IdentityVerifierError::expired());
        }
        let (subject, email) = match token.split_once('|') {
            Some((subject, email)) => (subject, Some(email)),
            None => (token, None),
        };
        let user_id = UserId::new(subject)
            .map_err(|err| IdentityVerifierError::invalid_claims(err.to_string()))?;
        let email = email
            .map(crate::domain::Email::new)
            .transpose()
            .map_err(|err| IdentityVerifierError::invalid_claims(err.to_string()))?;
        Ok(VerifiedIdentity::new(user_id, email))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_splits_subject_and_email() {
        let identity = FixtureIdentityVerifier
            .verify("sub-1|ada@example.com")
            .await
            .expect("fixture token accepted");
        assert_eq!(identity.user_id.as_ref(), "sub-1");
        assert_eq!(
            identity.email.as_ref().map(AsRef::<str>::as_ref),
            Some("ada@example.com")
        );
    }

    #[rstest]
    #[case("expired", IdentityVerifierError::expired())]
    #[case("", IdentityVerifierError::invalid_claims("user id must not be empty"))]
    #[tokio::test]
    async fn fixture_rejects_bad_tokens(
        #[case] token: &str,
        #[case] expected: IdentityVerifierError,
    ) {
        let err = FixtureIdentityVerifier
            .verify(token)
            .await
            .expect_err("token rejected");
        assert_eq!(err, expected);
    }
}
