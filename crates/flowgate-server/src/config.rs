//! Server configuration read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `FLOWGATE_BIND` | `0.0.0.0` |
//! | `FLOWGATE_PORT` | `3000` |
//! | `AZURE_AD_CLIENT_ID`, `AZURE_AD_TENANT_ID`, `AZURE_AD_CLIENT_SECRET` | unset |
//! | `FLOWGATE_WAREHOUSE_PATH` | unset |
//! | `FLOWGATE_TABLE` | `FLOW_DATA` |
//! | `FLOWGATE_SESSION_IDLE_SECS` | `3600` |
//! | `FLOWGATE_COOKIE_SECURE` | `false` |
//!
//! Missing identity or warehouse settings are not startup failures; they are
//! reported through `GET /api/auth/status`.

use std::fmt;
use std::time::Duration;

use flowgate_core::TableName;
use flowgate_warehouse::WarehouseConfig;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_IDLE_SECS: u64 = 3600;

/// Identity provider registration. Only built when all three parts are set.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub client_id: String,
    pub tenant_id: String,
    pub client_secret: String,
}

impl IdentityConfig {
    /// Returns `None` unless every part is present and non-blank.
    pub fn from_parts(
        client_id: Option<String>,
        tenant_id: Option<String>,
        client_secret: Option<String>,
    ) -> Option<Self> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Some(IdentityConfig {
            client_id: present(client_id)?,
            tenant_id: present(tenant_id)?,
            client_secret: present(client_secret)?,
        })
    }

    pub fn authority(&self) -> String {
        format!("https://login.microsoftonline.com/{}", self.tenant_id)
    }

    /// Expected `iss` claim of v2.0 access tokens.
    pub fn issuer(&self) -> String {
        format!("{}/v2.0", self.authority())
    }

    /// The tenant's signing key set.
    pub fn jwks_uri(&self) -> String {
        format!("{}/discovery/v2.0/keys", self.authority())
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("client_id", &self.client_id)
            .field("tenant_id", &self.tenant_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub identity: Option<IdentityConfig>,
    pub warehouse: WarehouseConfig,
    pub session_idle: Duration,
    pub cookie_secure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            identity: None,
            warehouse: WarehouseConfig::default(),
            session_idle: Duration::from_secs(DEFAULT_IDLE_SECS),
            cookie_secure: false,
        }
    }
}

impl ServerConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();

        let port = match lookup("FLOWGATE_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| format!("FLOWGATE_PORT: invalid port '{}'", raw))?,
            None => defaults.port,
        };

        let table = match lookup("FLOWGATE_TABLE") {
            Some(raw) => TableName::new(raw.trim()).map_err(|e| format!("FLOWGATE_TABLE: {e}"))?,
            None => TableName::default(),
        };

        let session_idle = match lookup("FLOWGATE_SESSION_IDLE_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|_| {
                format!("FLOWGATE_SESSION_IDLE_SECS: invalid seconds '{}'", raw)
            })?),
            None => defaults.session_idle,
        };

        let cookie_secure = lookup("FLOWGATE_COOKIE_SECURE")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.cookie_secure);

        Ok(ServerConfig {
            bind: lookup("FLOWGATE_BIND").unwrap_or(defaults.bind),
            port,
            identity: IdentityConfig::from_parts(
                lookup("AZURE_AD_CLIENT_ID"),
                lookup("AZURE_AD_TENANT_ID"),
                lookup("AZURE_AD_CLIENT_SECRET"),
            ),
            warehouse: WarehouseConfig {
                path: lookup("FLOWGATE_WAREHOUSE_PATH"),
                table,
            },
            session_idle,
            cookie_secure,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert!(config.identity.is_none());
        assert!(!config.warehouse.is_complete());
        assert_eq!(config.warehouse.table.as_str(), "FLOW_DATA");
        assert_eq!(config.session_idle, Duration::from_secs(3600));
        assert!(!config.cookie_secure);
    }

    #[test]
    fn identity_requires_all_three_parts() {
        let partial = ServerConfig::from_lookup(lookup_from(&[
            ("AZURE_AD_CLIENT_ID", "client"),
            ("AZURE_AD_TENANT_ID", "tenant"),
        ]))
        .unwrap();
        assert!(partial.identity.is_none());

        let full = ServerConfig::from_lookup(lookup_from(&[
            ("AZURE_AD_CLIENT_ID", "client"),
            ("AZURE_AD_TENANT_ID", "tenant"),
            ("AZURE_AD_CLIENT_SECRET", "s3cret"),
        ]))
        .unwrap();
        let identity = full.identity.unwrap();
        assert_eq!(identity.issuer(), "https://login.microsoftonline.com/tenant/v2.0");
        assert_eq!(
            identity.jwks_uri(),
            "https://login.microsoftonline.com/tenant/discovery/v2.0/keys"
        );
        assert!(!format!("{identity:?}").contains("s3cret"));
    }

    #[test]
    fn parses_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("FLOWGATE_PORT", "8080"),
            ("FLOWGATE_BIND", "127.0.0.1"),
            ("FLOWGATE_WAREHOUSE_PATH", "flows.db"),
            ("FLOWGATE_TABLE", "ANALYTICS.FLOWS"),
            ("FLOWGATE_SESSION_IDLE_SECS", "60"),
            ("FLOWGATE_COOKIE_SECURE", "true"),
        ]))
        .unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert!(config.warehouse.is_complete());
        assert_eq!(config.warehouse.table.as_str(), "ANALYTICS.FLOWS");
        assert_eq!(config.session_idle, Duration::from_secs(60));
        assert!(config.cookie_secure);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ServerConfig::from_lookup(lookup_from(&[("FLOWGATE_PORT", "http")])).is_err());
        assert!(
            ServerConfig::from_lookup(lookup_from(&[("FLOWGATE_TABLE", "FLOWS; DROP")])).is_err()
        );
    }
}
