use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// What a valid session token resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    // ---
    pub user_id: Uuid,
    pub phone_number: String,
    pub expires_at: i64,
}

/// Storage for bearer session tokens issued at login and registration.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    // ---
    /// Issue a new token for the user.
    async fn create(&self, user_id: Uuid, phone_number: &str) -> Result<String>;

    /// Resolve a token; `None` if unknown or expired.
    async fn validate(&self, token: &str) -> Result<Option<SessionInfo>>;

    /// Forget a token. Revoking an unknown token is not an error.
    async fn revoke(&self, token: &str) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

/// Type alias for any backend that implements SessionStore.
pub type SessionStorePtr = Arc<dyn SessionStore>;
