//! Identity store collaborator: resolves a token subject to a live account.
//!
//! The middleware depends on this trait rather than on the database so its
//! state machine can be exercised with a stub store.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::entities::users::{self, Role};
use crate::error::AppError;

/// Resolved account behind a token subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// `Ok(None)` means the subject no longer resolves to an account
    /// (deleted user, or a subject that is not a numeric id at all).
    async fn load_identity(&self, subject: &str) -> Result<Option<Identity>, AppError>;
}

/// Production store backed by the `users` table.
pub struct SeaIdentityStore {
    db: DatabaseConnection,
}

impl SeaIdentityStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityStore for SeaIdentityStore {
    async fn load_identity(&self, subject: &str) -> Result<Option<Identity>, AppError> {
        let Ok(user_id) = subject.parse::<i64>() else {
            return Ok(None);
        };

        let user = users::Entity::find_by_id(user_id).one(&self.db).await?;

        Ok(user.map(|u| Identity {
            user_id: u.id,
            role: u.role,
        }))
    }
}
