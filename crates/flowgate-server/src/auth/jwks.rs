//! Signing-key cache.
//!
//! [`JwksCache`] maps key ids (`kid`) to decoding keys. A remote cache
//! fetches the provider's key set on first use and again whenever a token
//! names a `kid` it does not hold, so key rotation is picked up without a
//! restart. A static cache is seeded once and never fetches.

use std::collections::HashMap;

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;

use super::AuthError;

enum KeySource {
    Remote { uri: String, http: reqwest::Client },
    Static,
}

pub struct JwksCache {
    source: KeySource,
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl JwksCache {
    /// A cache that loads keys from `uri` on demand.
    pub fn remote(uri: impl Into<String>) -> Self {
        JwksCache {
            source: KeySource::Remote {
                uri: uri.into(),
                http: reqwest::Client::new(),
            },
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// A fixed cache holding the keys of `set`.
    pub fn from_jwk_set(set: &JwkSet) -> Self {
        JwksCache {
            source: KeySource::Static,
            keys: RwLock::new(decoding_keys(set)),
        }
    }

    /// The decoding key for `kid`, refetching the key set once on a miss.
    pub async fn key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(key.clone());
        }

        if let KeySource::Remote { .. } = self.source {
            self.refresh().await?;
            if let Some(key) = self.keys.read().await.get(kid) {
                return Ok(key.clone());
            }
        }

        Err(AuthError::TokenInvalid(format!(
            "no signing key matches kid '{}'",
            kid
        )))
    }

    /// Replaces the cached keys with a fresh copy of the remote key set.
    /// Returns the number of usable keys. A static cache is left unchanged.
    pub async fn refresh(&self) -> Result<usize, AuthError> {
        let KeySource::Remote { uri, http } = &self.source else {
            return Ok(self.keys.read().await.len());
        };

        let response = http
            .get(uri)
            .send()
            .await
            .map_err(|err| AuthError::KeyFetch(format!("request to {} failed: {}", uri, err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::KeyFetch(format!("{} returned {}", uri, status)));
        }

        let set: JwkSet = response
            .json()
            .await
            .map_err(|err| AuthError::KeyFetch(format!("malformed key set: {}", err)))?;

        let fresh = decoding_keys(&set);
        let count = fresh.len();
        *self.keys.write().await = fresh;
        tracing::info!("Loaded {} signing key(s) from {}", count, uri);
        Ok(count)
    }

    /// Number of cached keys.
    pub async fn len(&self) -> usize {
        self.keys.read().await.len()
    }
}

fn decoding_keys(set: &JwkSet) -> HashMap<String, DecodingKey> {
    set.keys
        .iter()
        .filter_map(|jwk| {
            let kid = jwk.common.key_id.clone()?;
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some((kid, key)),
                Err(err) => {
                    tracing::debug!("Skipping signing key '{}': {}", kid, err);
                    None
                }
            }
        })
        .collect()
}
