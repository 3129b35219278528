use anyhow::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::{SessionInfo, SessionStore, SessionStorePtr};

pub fn create_memory_sessions(ttl: Duration) -> SessionStorePtr {
    // ---
    Arc::new(MemorySessionStore::new(ttl))
}

/// Process-local [`SessionStore`]; expired entries are dropped on lookup.
pub struct MemorySessionStore {
    // ---
    sessions: DashMap<String, SessionInfo>,
    ttl: Duration,
}

impl MemorySessionStore {
    // ---
    pub fn new(ttl: Duration) -> Self {
        // ---
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    // ---
    async fn create(&self, user_id: Uuid, phone_number: &str) -> Result<String> {
        // ---
        let token = Uuid::new_v4().to_string();
        let session = SessionInfo {
            user_id,
            phone_number: phone_number.to_string(),
            expires_at: chrono::Utc::now().timestamp() + self.ttl.as_secs() as i64,
        };
        self.sessions.insert(token.clone(), session);

        Ok(token)
    }

    async fn validate(&self, token: &str) -> Result<Option<SessionInfo>> {
        // ---
        let now = chrono::Utc::now().timestamp();
        let session = self.sessions.get(token).map(|s| s.clone());

        match session {
            Some(s) if s.expires_at > now => Ok(Some(s)),
            Some(_) => {
                self.sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        // ---
        self.sessions.remove(token);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
