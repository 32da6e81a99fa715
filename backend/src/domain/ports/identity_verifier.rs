//! Port for turning a bearer credential into a verified caller.
//!
//! Token issuance belongs to the external identity provider; adapters only
//! check signatures and claims.

use crate::domain::CallerIdentity;

use super::define_port_error;

define_port_error! {
    /// Reasons a credential is refused.
    pub enum IdentityError {
        /// No bearer credential accompanied the request.
        MissingCredential => "missing bearer credential",
        /// The credential failed signature, expiry, audience or claim checks.
        InvalidCredential { reason: String } => "invalid bearer credential: {reason}",
    }
}

/// Verifies bearer credentials.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityVerifier: Send + Sync {
    /// Check `token` and return the caller it identifies.
    fn verify(&self, token: &str) -> Result<CallerIdentity, IdentityError>;
}
