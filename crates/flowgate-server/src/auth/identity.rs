//! Identity claims carried by access tokens.

use serde::{Deserialize, Serialize};

/// The authenticated user as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub email: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "oid")]
    pub subject_id: String,
}

/// The subset of token claims used to build a [`UserIdentity`]. Registered
/// claims (`aud`, `iss`, `exp`) are checked by the validator, not read here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
}

impl From<IdentityClaims> for UserIdentity {
    fn from(claims: IdentityClaims) -> Self {
        UserIdentity {
            email: claims
                .preferred_username
                .or(claims.email)
                .unwrap_or_default(),
            display_name: claims.name.unwrap_or_default(),
            subject_id: claims.oid.or(claims.sub).unwrap_or_default(),
        }
    }
}
