//! Access-token validation.
//!
//! Accepts only RS256 tokens whose header names a known signing key and
//! whose `aud`, `iss` and `exp` claims match the configured application.

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use super::identity::{IdentityClaims, UserIdentity};
use super::jwks::JwksCache;
use super::AuthError;
use crate::config::IdentityConfig;

pub struct TokenVerifier {
    config: IdentityConfig,
    keys: JwksCache,
}

impl TokenVerifier {
    /// A verifier that loads signing keys from the tenant's JWKS endpoint.
    pub fn new(config: IdentityConfig) -> Self {
        let keys = JwksCache::remote(config.jwks_uri());
        TokenVerifier { config, keys }
    }

    /// A verifier over a caller-supplied key cache.
    pub fn with_keys(config: IdentityConfig, keys: JwksCache) -> Self {
        TokenVerifier { config, keys }
    }

    pub async fn verify(&self, token: &str) -> Result<UserIdentity, AuthError> {
        let header = decode_header(token)
            .map_err(|err| AuthError::TokenInvalid(format!("malformed token: {}", err)))?;

        if header.alg != Algorithm::RS256 {
            return Err(AuthError::TokenInvalid(format!(
                "unsupported signing algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AuthError::TokenInvalid("token header has no key id".to_string()))?;
        let key = self.keys.key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.config.client_id.as_str()]);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        let data = decode::<IdentityClaims>(token, &key, &validation)
            .map_err(|err| AuthError::TokenInvalid(err.to_string()))?;

        Ok(UserIdentity::from(data.claims))
    }
}
