//! Identity adapters implementing [`IdentityVerifier`](crate::domain::ports::IdentityVerifier).

mod jwt;

pub use jwt::{DEFAULT_AUDIENCE, JwtIdentityVerifier};
