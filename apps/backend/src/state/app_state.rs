use std::fmt;
use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::identity::{IdentityStore, SeaIdentityStore};

use super::security_config::SecurityConfig;

/// Shared, read-only-after-startup application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection (absent in middleware-only test setups).
    pub db: Option<DatabaseConnection>,
    /// Signing secret and token lifetimes.
    pub security: SecurityConfig,
    /// Resolves token subjects to live accounts.
    pub identity: Arc<dyn IdentityStore>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, security: SecurityConfig) -> Self {
        let identity = Arc::new(SeaIdentityStore::new(db.clone()));
        Self {
            db: Some(db),
            security,
            identity,
        }
    }

    /// State without a database, wired to a caller-supplied identity store.
    /// Used by middleware tests and anything mocking the account lookup.
    pub fn with_identity_store(security: SecurityConfig, identity: Arc<dyn IdentityStore>) -> Self {
        Self {
            db: None,
            security,
            identity,
        }
    }

    pub fn require_db(&self) -> Result<&DatabaseConnection, crate::error::AppError> {
        self.db
            .as_ref()
            .ok_or_else(|| crate::error::AppError::internal("database connection not available"))
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db.is_some())
            .field("security", &"SecurityConfig { .. }")
            .finish()
    }
}
