//! Application state shared by all handlers.
//!
//! The warehouse backend holds a `rusqlite::Connection`, which is `!Sync`,
//! so it sits behind a `tokio::sync::Mutex`; handlers await the lock without
//! blocking the runtime, and queries on the single connection run one at a
//! time.

use std::sync::Arc;

use flowgate_warehouse::{FlowRow, InMemoryWarehouse, SqliteWarehouse, Warehouse};

use crate::auth::TokenVerifier;
use crate::config::ServerConfig;
use crate::session::SessionStore;

pub type SharedWarehouse = Arc<tokio::sync::Mutex<Box<dyn Warehouse>>>;

#[derive(Clone)]
pub struct AppState {
    /// Live sessions keyed by cookie id.
    pub sessions: Arc<SessionStore>,
    /// `None` when the identity provider is not configured.
    pub verifier: Option<Arc<TokenVerifier>>,
    /// The data gateway's warehouse connection.
    pub warehouse: SharedWarehouse,
    /// Whether a warehouse location was configured.
    pub warehouse_configured: bool,
    /// Adds `Secure` to the session cookie.
    pub cookie_secure: bool,
}

impl AppState {
    /// Builds state from configuration. The warehouse connects lazily on the
    /// first query.
    pub fn new(config: &ServerConfig) -> Self {
        let verifier = match &config.identity {
            Some(identity) => Some(TokenVerifier::new(identity.clone())),
            None => {
                tracing::warn!(
                    "Azure AD configuration incomplete; token authentication is disabled"
                );
                None
            }
        };

        let warehouse_configured = config.warehouse.is_complete();
        if !warehouse_configured {
            tracing::warn!("Warehouse configuration incomplete; data routes will fail");
        }

        let mut state = AppState::from_parts(
            verifier,
            SqliteWarehouse::new(config.warehouse.clone()),
            warehouse_configured,
        );
        state.cookie_secure = config.cookie_secure;
        state
    }

    pub fn from_parts(
        verifier: Option<TokenVerifier>,
        warehouse: impl Warehouse + 'static,
        warehouse_configured: bool,
    ) -> Self {
        let warehouse: Box<dyn Warehouse> = Box::new(warehouse);
        AppState {
            sessions: Arc::new(SessionStore::new()),
            verifier: verifier.map(Arc::new),
            warehouse: Arc::new(tokio::sync::Mutex::new(warehouse)),
            warehouse_configured,
            cookie_secure: false,
        }
    }

    /// State over in-process rows (for testing).
    pub fn in_memory(verifier: Option<TokenVerifier>, rows: Vec<FlowRow>) -> Self {
        AppState::from_parts(verifier, InMemoryWarehouse::new(rows), true)
    }

    /// Closes the warehouse connection. Used at shutdown.
    pub async fn close_warehouse(&self) {
        let mut warehouse = self.warehouse.lock().await;
        match warehouse.close() {
            Ok(()) => tracing::info!("Warehouse connection closed"),
            Err(err) => tracing::error!("Error closing warehouse connection: {}", err),
        }
    }
}
