//! Session tokens stored in Redis with a bounded time-to-live.

use anyhow::{Context, Result};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::{SessionInfo, SessionStore, SessionStorePtr};

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

pub fn create_redis_sessions(url: &str, ttl: Duration) -> Result<SessionStorePtr> {
    // ---
    let client = Client::open(url).context("invalid redis url")?;
    Ok(Arc::new(RedisSessionStore::new(client, ttl)))
}

/// Redis-backed [`SessionStore`]. A multiplexed connection is opened per call.
pub struct RedisSessionStore {
    // ---
    client: Client,
    ttl: Duration,
}

impl RedisSessionStore {
    // ---
    pub fn new(client: Client, ttl: Duration) -> Self {
        // ---
        Self { client, ttl }
    }

    async fn conn(&self) -> Result<MultiplexedConnection> {
        // ---
        self.client
            .get_multiplexed_async_connection()
            .await
            .context("Failed to connect to Redis")
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    // ---
    async fn create(&self, user_id: Uuid, phone_number: &str) -> Result<String> {
        // ---
        let token = Uuid::new_v4().to_string();
        let ttl_secs = self.ttl.as_secs().max(1);

        let session = SessionInfo {
            user_id,
            phone_number: phone_number.to_string(),
            expires_at: chrono::Utc::now().timestamp() + ttl_secs as i64,
        };
        let session_json = serde_json::to_string(&session)?;

        self.conn()
            .await?
            .set_ex::<_, _, ()>(session_key(&token), session_json, ttl_secs)
            .await
            .context("Failed to store session in Redis")?;

        tracing::info!(%user_id, "created session");

        Ok(token)
    }

    async fn validate(&self, token: &str) -> Result<Option<SessionInfo>> {
        // ---
        let raw: Option<String> = self
            .conn()
            .await?
            .get(session_key(token))
            .await
            .context("Failed to read session from Redis")?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let session: SessionInfo = serde_json::from_str(&raw)?;
        if session.expires_at <= chrono::Utc::now().timestamp() {
            return Ok(None);
        }

        Ok(Some(session))
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        // ---
        self.conn()
            .await?
            .del::<_, ()>(session_key(token))
            .await
            .context("Failed to delete session from Redis")?;

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        // ---
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
