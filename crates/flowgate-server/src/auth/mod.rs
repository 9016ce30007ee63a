//! Bearer-token verification against the identity provider.
//!
//! - [`identity`]: claims and the [`UserIdentity`] extracted from them
//! - [`jwks`]: signing-key cache keyed by `kid`
//! - [`verifier`]: RS256 validation of audience, issuer and expiry

pub mod identity;
pub mod jwks;
pub mod verifier;

pub use identity::UserIdentity;
pub use jwks::JwksCache;
pub use verifier::TokenVerifier;

/// Reasons a token is not accepted.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token failed a check; the message says which.
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// The signing key set could not be retrieved.
    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(String),
}
