//! HS256 bearer token verification.
//!
//! Tokens are minted by the external identity provider with a shared secret.
//! The verifier checks signature, expiry and audience, then lifts the `sub`
//! and `email` claims into a [`CallerIdentity`].

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use tracing::debug;

use crate::domain::ports::{IdentityError, IdentityVerifier};
use crate::domain::{CallerIdentity, UserId};

/// Audience the identity provider stamps on user sessions.
pub const DEFAULT_AUDIENCE: &str = "authenticated";

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// Shared-secret verifier for identity-provider tokens.
#[derive(Clone)]
pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    /// Build a verifier accepting tokens signed with `secret` for `audience`.
    pub fn new(secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtIdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityVerifier")
            .field("audience", &self.validation.aud)
            .finish_non_exhaustive()
    }
}

fn describe(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::ExpiredSignature => "token expired",
        ErrorKind::InvalidAudience => "unexpected audience",
        ErrorKind::InvalidSignature => "signature mismatch",
        ErrorKind::InvalidAlgorithm => "unsupported algorithm",
        ErrorKind::MissingRequiredClaim(_) => "required claim missing",
        _ => "malformed token",
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn verify(&self, token: &str) -> Result<CallerIdentity, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::missing_credential());
        }
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            IdentityError::invalid_credential(describe(err.kind()))
        })?;
        let Claims { sub, email } = data.claims;
        let id = UserId::new(sub)
            .map_err(|err| IdentityError::invalid_credential(format!("subject claim: {err}")))?;
        let email = email
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| IdentityError::invalid_credential("email claim missing"))?;
        Ok(CallerIdentity::new(id, email))
    }
}
